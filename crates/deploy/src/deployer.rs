//! Top-level deployment sequence.

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    chain::Chain,
    network::{NetworkDeployment, NetworkRegistry},
    repo::{RepoRegistrar, RepoRegistration, validate_subdomain, verify_factory_registry},
    settings::{DeploymentSettings, RepoSettings},
    setup::SetupDeployer,
    store::FsDeploymentStore,
};

/// Name the deployment record is persisted under.
pub const LATEST_DEPLOYMENT: &str = "latest";

/// The persisted outcome of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub tag_voting_setup: Address,
    pub tag_voting_repo: Address,
}

/// Deploys the setup contract, registers the plugin repo and records the result.
///
/// With `force_redeploy = Some(false)` the previous record is returned as is and the
/// chain is never touched. Otherwise the whole sequence runs and the record is written
/// only once every step has succeeded. Configuration is checked before the first
/// transaction: the network, the subdomain and the factory's registry.
#[derive(Debug, Clone)]
pub struct DeploymentOrchestrator {
    settings: DeploymentSettings,
    networks: NetworkRegistry,
    store: FsDeploymentStore,
}

impl DeploymentOrchestrator {
    pub fn new(settings: DeploymentSettings, networks: NetworkRegistry, store: FsDeploymentStore) -> Self {
        Self {
            settings,
            networks,
            store,
        }
    }

    pub fn settings(&self) -> &DeploymentSettings {
        &self.settings
    }

    pub fn store(&self) -> &FsDeploymentStore {
        &self.store
    }

    /// Load the persisted record.
    pub fn load_latest(&self) -> Result<DeploymentRecord> {
        self.store.load(LATEST_DEPLOYMENT)
    }

    /// The cached path: return the persisted record without any chain interaction.
    pub fn load_cached(&self) -> Result<DeploymentRecord> {
        let record = self.load_latest()?;
        tracing::info!(
            tag_voting_setup = %record.tag_voting_setup,
            tag_voting_repo = %record.tag_voting_repo,
            "Using persisted deployment, skipping deployment"
        );
        Ok(record)
    }

    pub async fn deploy<C: Chain>(&self, chain: &C) -> Result<DeploymentRecord> {
        if self.settings.uses_cached_record() {
            return self.load_cached();
        }

        tracing::info!("Starting deployment process...");

        // Configuration errors surface before the first transaction.
        let chain_settings = chain.settings();
        let network = self.network_deployment(chain_settings.chain_id)?;
        let repo = self
            .settings
            .repo
            .clone()
            .unwrap_or_else(|| RepoSettings::with_maintainer(chain_settings.default_from));
        validate_subdomain(&repo.subdomain)?;
        verify_factory_registry(chain, &network).await?;

        let tag_voting_setup = SetupDeployer::new(self.settings.setup.clone())
            .deploy(chain)
            .await
            .context("Failed to deploy TagVotingSetup")?;

        let tag_voting_repo = RepoRegistrar::new(self.settings.event_policy)
            .register(
                chain,
                RepoRegistration {
                    plugin_repo_factory: network.plugin_repo_factory,
                    plugin_repo_registry: network.plugin_repo_registry,
                    plugin_setup: tag_voting_setup,
                    subdomain: repo.subdomain,
                    maintainer: repo.maintainer,
                    overrides: repo.overrides,
                },
            )
            .await
            .context("Failed to create TagVoting plugin repo")?;

        let record = DeploymentRecord {
            tag_voting_setup,
            tag_voting_repo,
        };
        let path = self.store.save(LATEST_DEPLOYMENT, &record)?;

        tracing::info!("✓ Deployment complete!");
        tracing::info!("TagVotingSetup:       {}", record.tag_voting_setup);
        tracing::info!("TagVoting plugin repo: {}", record.tag_voting_repo);
        tracing::info!("Record:               {}", path.display());

        Ok(record)
    }

    /// The explicit override if configured, otherwise the registry entry for `chain_id`.
    fn network_deployment(&self, chain_id: u64) -> Result<NetworkDeployment> {
        if let Some(deployment) = self.settings.network_deployment {
            tracing::info!(
                factory = %deployment.plugin_repo_factory,
                registry = %deployment.plugin_repo_registry,
                "Using configured Aragon deployment"
            );
            return Ok(deployment);
        }

        let deployment = self
            .networks
            .resolve_chain(chain_id, self.settings.protocol_version)?;
        tracing::info!(
            chain_id,
            version = %self.settings.protocol_version,
            factory = %deployment.plugin_repo_factory,
            registry = %deployment.plugin_repo_registry,
            "Resolved Aragon deployment"
        );
        Ok(deployment)
    }
}
