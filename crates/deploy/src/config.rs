//! Serializable deployment configuration.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    client::{DEFAULT_RECEIPT_MAX_ATTEMPTS, RpcChainConfig, query_chain_id},
    deployer::{DeploymentOrchestrator, DeploymentRecord},
    error::DeployError,
    network::NetworkRegistry,
    rpc,
    settings::DeploymentSettings,
    signer::SenderSource,
    store::FsDeploymentStore,
};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = "TagVoting.toml";

/// Local development node.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Everything needed to connect to a network and deploy the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub rpc_url: String,

    /// Expected chain id. Required to reuse a persisted record without connecting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,

    /// Default sender. Takes precedence over `private_key` and `mnemonic`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    pub mnemonic_index: u32,

    /// Foundry output directory (`<artifacts>/<Contract>.sol/<Contract>.json`).
    pub artifacts: PathBuf,
    /// Root of the persisted records, one subdirectory per chain id.
    pub outdata: PathBuf,

    pub request_timeout_secs: u64,
    pub receipt_poll_interval_ms: u64,
    pub receipt_max_attempts: usize,

    pub deployment: DeploymentSettings,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: None,
            from: None,
            private_key: None,
            mnemonic: None,
            mnemonic_index: 0,
            artifacts: PathBuf::from("out"),
            outdata: PathBuf::from("deployments"),
            request_timeout_secs: rpc::DEFAULT_TIMEOUT.as_secs(),
            receipt_poll_interval_ms: 1000,
            receipt_max_attempts: DEFAULT_RECEIPT_MAX_ATTEMPTS,
            deployment: DeploymentSettings::default(),
        }
    }
}

impl DeployConfig {
    /// Resolve the default sender from `from`, `private_key` or `mnemonic`.
    pub fn sender(&self) -> Result<Address> {
        SenderSource {
            from: self.from,
            private_key: self.private_key.as_deref(),
            mnemonic: self.mnemonic.as_deref(),
            mnemonic_index: self.mnemonic_index,
        }
        .resolve()
    }

    pub fn rpc_chain_config(&self) -> Result<RpcChainConfig> {
        let mut config = RpcChainConfig::new(self.parsed_rpc_url()?, self.sender()?, &self.artifacts);
        config.expected_chain_id = self.chain_id;
        config.cache_dir = Some(self.outdata.clone());
        config.request_timeout = Duration::from_secs(self.request_timeout_secs);
        config.receipt_poll_interval = Duration::from_millis(self.receipt_poll_interval_ms);
        config.receipt_max_attempts = self.receipt_max_attempts;
        Ok(config)
    }

    /// The configured chain id, or the one reported by the endpoint.
    pub async fn resolve_chain_id(&self) -> Result<u64> {
        if let Some(chain_id) = self.chain_id {
            return Ok(chain_id);
        }

        let client = rpc::create_client(Duration::from_secs(self.request_timeout_secs))?;
        query_chain_id(&client, &self.parsed_rpc_url()?).await
    }

    fn parsed_rpc_url(&self) -> Result<Url> {
        Url::parse(&self.rpc_url).with_context(|| format!("Invalid RPC URL {}", self.rpc_url))
    }

    /// The record store of `chain_id`.
    pub fn store(&self, chain_id: u64) -> FsDeploymentStore {
        FsDeploymentStore::for_chain(&self.outdata, chain_id)
    }

    pub fn orchestrator(&self, networks: NetworkRegistry, chain_id: u64) -> DeploymentOrchestrator {
        DeploymentOrchestrator::new(self.deployment.clone(), networks, self.store(chain_id))
    }

    /// The persisted record of the configured chain. Never contacts the endpoint, so the
    /// chain id must be configured.
    pub fn cached_deployment(&self, networks: NetworkRegistry) -> Result<DeploymentRecord> {
        let chain_id = self.chain_id.ok_or(DeployError::ChainIdRequired)?;
        self.orchestrator(networks, chain_id).load_cached()
    }

    /// Save the configuration as TOML, creating parent directories as needed.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration to {}", path.display()))?;

        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }
}
