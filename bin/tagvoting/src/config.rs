//! Layered configuration: built-in defaults, then the TOML file, then the
//! `TAGVOTING_*` environment, then command line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tagvoting_deploy::{DEFAULT_CONFIG_FILENAME, DeployConfig, RepoSettings};

use crate::cli::{ConnectionArgs, DeployArgs};

pub const ENV_PREFIX: &str = "TAGVOTING_";

/// Load the configuration. An explicitly requested file must exist.
pub fn load(path: Option<&Path>) -> Result<DeployConfig> {
    let file = match path {
        Some(path) if !path.exists() => {
            anyhow::bail!("Configuration file not found: {}", path.display())
        }
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(DEFAULT_CONFIG_FILENAME),
    };

    let config: DeployConfig = Figment::from(Serialized::defaults(DeployConfig::default()))
        .merge(Toml::file(&file))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .with_context(|| format!("Failed to load configuration (file: {})", file.display()))?;

    if file.exists() {
        tracing::info!(path = %file.display(), "Configuration loaded");
    }
    Ok(config)
}

impl ConnectionArgs {
    pub fn apply(&self, config: &mut DeployConfig) {
        if let Some(rpc_url) = &self.rpc_url {
            config.rpc_url = rpc_url.clone();
        }
        if self.chain_id.is_some() {
            config.chain_id = self.chain_id;
        }
        if self.from.is_some() {
            config.from = self.from;
        }
        if self.private_key.is_some() {
            config.private_key = self.private_key.clone();
        }
        if self.mnemonic.is_some() {
            config.mnemonic = self.mnemonic.clone();
        }
        if let Some(index) = self.mnemonic_index {
            config.mnemonic_index = index;
        }
        if let Some(artifacts) = &self.artifacts {
            config.artifacts = artifacts.clone();
        }
        if let Some(outdata) = &self.outdata {
            config.outdata = outdata.clone();
        }
    }
}

impl DeployArgs {
    pub fn apply(&self, config: &mut DeployConfig) -> Result<()> {
        if self.redeploy {
            config.deployment.force_redeploy = Some(true);
        } else if self.use_cached {
            config.deployment.force_redeploy = Some(false);
        }

        if let Some(policy) = self.event_policy {
            config.deployment.event_policy = policy;
        }

        if self.subdomain.is_some() || self.maintainer.is_some() {
            let mut repo = match config.deployment.repo.take() {
                Some(repo) => repo,
                None => RepoSettings::with_maintainer(match self.maintainer {
                    Some(maintainer) => maintainer,
                    None => config.sender()?,
                }),
            };
            if let Some(subdomain) = &self.subdomain {
                repo.subdomain = subdomain.clone();
            }
            if let Some(maintainer) = self.maintainer {
                repo.maintainer = maintainer;
            }
            config.deployment.repo = Some(repo);
        }

        Ok(())
    }
}
