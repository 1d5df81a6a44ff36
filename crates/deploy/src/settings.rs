//! Deployment settings.

use alloy_core::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

use crate::{
    chain::TxOverrides,
    network::{NetworkDeployment, ProtocolVersion},
};

/// Subdomain the repository is registered under when none is configured.
pub const DEFAULT_SUBDOMAIN: &str = "tag-voting";

/// How to deploy the setup contract and register its repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentSettings {
    /// `Some(false)` reuses the persisted `latest` record without touching the chain.
    /// `None` and `Some(true)` run a fresh deployment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_redeploy: Option<bool>,
    pub protocol_version: ProtocolVersion,
    pub event_policy: EventPolicy,
    pub setup: SetupSettings,
    /// Defaults to [`RepoSettings::with_maintainer`] of the default sender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<RepoSettings>,
    /// Use these singletons instead of the built-in network table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_deployment: Option<NetworkDeployment>,
}

impl DeploymentSettings {
    pub fn uses_cached_record(&self) -> bool {
        self.force_redeploy == Some(false)
    }
}

/// Settings for the `TagVotingSetup` contract creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupSettings {
    /// ABI-encoded constructor arguments.
    pub constructor_args: Bytes,
    #[serde(flatten)]
    pub overrides: TxOverrides,
}

/// Settings for the plugin repository registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSettings {
    pub subdomain: String,
    pub maintainer: Address,
    #[serde(flatten)]
    pub overrides: TxOverrides,
}

impl RepoSettings {
    /// The default registration: subdomain `tag-voting`, maintained by `maintainer`.
    pub fn with_maintainer(maintainer: Address) -> Self {
        Self {
            subdomain: DEFAULT_SUBDOMAIN.to_string(),
            maintainer,
            overrides: TxOverrides::default(),
        }
    }
}

/// What to do when a registration transaction carries several `PluginRepoRegistered` events.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EventPolicy {
    /// Take the first event, logging a warning if there are more.
    #[default]
    First,
    /// Fail unless exactly one event is present.
    ExactlyOne,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;

    #[test]
    fn test_defaults_run_fresh_deployment() {
        let settings = DeploymentSettings::default();

        assert!(!settings.uses_cached_record());
        assert_eq!(settings.event_policy, EventPolicy::First);
        assert_eq!(settings.protocol_version, ProtocolVersion::V1_3_0);
        assert!(settings.repo.is_none());
        assert!(settings.network_deployment.is_none());
    }

    #[test]
    fn test_force_redeploy_flag() {
        let mut settings = DeploymentSettings::default();

        settings.force_redeploy = Some(true);
        assert!(!settings.uses_cached_record());

        settings.force_redeploy = Some(false);
        assert!(settings.uses_cached_record());
    }

    #[test]
    fn test_parse_from_toml() {
        let settings: DeploymentSettings = toml::from_str(
            r#"
            force_redeploy = false
            event_policy = "exactly-one"

            [setup]
            constructor_args = "0x"
            gas = 5000000

            [repo]
            subdomain = "my-tag-voting"
            maintainer = "0x00000000000000000000000000000000000000aa"

            [network_deployment]
            plugin_repo_factory = "0x00000000000000000000000000000000000000fa"
            plugin_repo_registry = "0x00000000000000000000000000000000000000fe"
            "#,
        )
        .unwrap();

        assert!(settings.uses_cached_record());
        assert_eq!(settings.event_policy, EventPolicy::ExactlyOne);
        assert_eq!(settings.setup.overrides.gas, Some(5_000_000));
        let repo = settings.repo.unwrap();
        assert_eq!(repo.subdomain, "my-tag-voting");
        assert_eq!(repo.maintainer, address!("00000000000000000000000000000000000000aa"));
        assert_eq!(
            settings.network_deployment.unwrap().plugin_repo_registry,
            address!("00000000000000000000000000000000000000fe")
        );
    }

    #[test]
    fn test_default_repo_settings() {
        let maintainer = address!("00000000000000000000000000000000000000aa");
        let repo = RepoSettings::with_maintainer(maintainer);

        assert_eq!(repo.subdomain, "tag-voting");
        assert_eq!(repo.maintainer, maintainer);
    }
}
