//! Deployment of the `TagVotingSetup` contract.

use alloy_core::primitives::Address;
use anyhow::Result;

use crate::{
    chain::{Chain, DeployRequest},
    settings::SetupSettings,
};

/// Logical id the setup deployment is cached under by the framework.
pub const TAG_VOTING_SETUP_ID: &str = "TagVotingSetup";

/// Name of the setup contract artifact.
pub const TAG_VOTING_SETUP_CONTRACT: &str = "TagVotingSetup";

/// Deploys the plugin's setup contract.
///
/// Deduplication is left to the [`Chain`] implementation, keyed by
/// [`TAG_VOTING_SETUP_ID`]; errors are returned as they come.
#[derive(Debug, Clone, Default)]
pub struct SetupDeployer {
    settings: SetupSettings,
}

impl SetupDeployer {
    pub fn new(settings: SetupSettings) -> Self {
        Self { settings }
    }

    pub fn request(&self) -> DeployRequest {
        DeployRequest {
            id: TAG_VOTING_SETUP_ID.to_string(),
            contract: TAG_VOTING_SETUP_CONTRACT.to_string(),
            constructor_args: self.settings.constructor_args.clone(),
            overrides: self.settings.overrides.clone(),
        }
    }

    pub async fn deploy<C: Chain>(&self, chain: &C) -> Result<Address> {
        let address = chain.deploy(self.request()).await?;
        tracing::info!(tag_voting_setup = %address, "TagVotingSetup ready");
        Ok(address)
    }
}
