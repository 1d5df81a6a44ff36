//! Aragon OSx network deployments.
//!
//! Resolves the `PluginRepoFactory` and `PluginRepoRegistry` singletons of a
//! supported network. The chain id mapping is closed: anything outside
//! [`SupportedNetwork`] is a configuration error.

use std::collections::BTreeMap;

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DeployError;

/// The built-in deployment table.
const ARAGON_OSX_DEPLOYMENTS: &str = include_str!("../networks/aragon-osx.toml");

/// Networks with a known Aragon OSx deployment.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SupportedNetwork {
    Mainnet,
    Polygon,
    Sepolia,
}

impl SupportedNetwork {
    /// Map a chain id onto its network.
    pub fn from_chain_id(chain_id: u64) -> Result<Self> {
        match chain_id {
            1 => Ok(Self::Mainnet),
            137 => Ok(Self::Polygon),
            11155111 => Ok(Self::Sepolia),
            other => Err(DeployError::UnknownNetwork(other).into()),
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Polygon => 137,
            Self::Sepolia => 11155111,
        }
    }
}

/// Aragon OSx protocol release.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum ProtocolVersion {
    #[default]
    #[serde(rename = "v1.3.0")]
    #[strum(serialize = "v1.3.0")]
    V1_3_0,
}

/// Addresses of the framework singletons on one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDeployment {
    pub plugin_repo_factory: Address,
    pub plugin_repo_registry: Address,
}

#[derive(Deserialize)]
struct DeploymentTable {
    deployment: Vec<DeploymentRow>,
}

#[derive(Deserialize)]
struct DeploymentRow {
    network: SupportedNetwork,
    version: ProtocolVersion,
    plugin_repo_factory: Address,
    plugin_repo_registry: Address,
}

/// Lookup table from `(network, version)` to [`NetworkDeployment`].
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    deployments: BTreeMap<(SupportedNetwork, ProtocolVersion), NetworkDeployment>,
}

impl NetworkRegistry {
    /// The registry shipped with this crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(ARAGON_OSX_DEPLOYMENTS)
            .context("Failed to parse built-in Aragon OSx deployments")
    }

    /// Parse a deployment table in the `networks/aragon-osx.toml` format.
    pub fn from_toml(content: &str) -> Result<Self> {
        let table: DeploymentTable =
            toml::from_str(content).context("Failed to parse deployment table as TOML")?;

        let deployments = table
            .deployment
            .into_iter()
            .map(|row| {
                let deployment = NetworkDeployment {
                    plugin_repo_factory: row.plugin_repo_factory,
                    plugin_repo_registry: row.plugin_repo_registry,
                };
                ((row.network, row.version), deployment)
            })
            .collect();

        Ok(Self { deployments })
    }

    /// Register (or replace) the deployment for a network and version.
    pub fn with_deployment(
        mut self,
        network: SupportedNetwork,
        version: ProtocolVersion,
        deployment: NetworkDeployment,
    ) -> Self {
        self.deployments.insert((network, version), deployment);
        self
    }

    pub fn resolve(
        &self,
        network: SupportedNetwork,
        version: ProtocolVersion,
    ) -> Option<&NetworkDeployment> {
        self.deployments.get(&(network, version))
    }

    /// Resolve the deployment for a chain id, failing on unknown chains or missing entries.
    pub fn resolve_chain(&self, chain_id: u64, version: ProtocolVersion) -> Result<NetworkDeployment> {
        let network = SupportedNetwork::from_chain_id(chain_id)?;

        self.resolve(network, version).copied().ok_or_else(|| {
            DeployError::MissingNetworkDeployment { network, version }.into()
        })
    }

    /// All known deployments, ordered by network then version.
    pub fn entries(
        &self,
    ) -> impl Iterator<Item = (SupportedNetwork, ProtocolVersion, &NetworkDeployment)> {
        self.deployments
            .iter()
            .map(|((network, version), deployment)| (*network, *version, deployment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;
    use strum::IntoEnumIterator;

    #[test]
    fn test_chain_id_mapping_is_closed() {
        assert_eq!(SupportedNetwork::from_chain_id(1).unwrap(), SupportedNetwork::Mainnet);
        assert_eq!(SupportedNetwork::from_chain_id(137).unwrap(), SupportedNetwork::Polygon);
        assert_eq!(
            SupportedNetwork::from_chain_id(11155111).unwrap(),
            SupportedNetwork::Sepolia
        );

        for chain_id in [0, 5, 10, 80001, 31337] {
            let err = SupportedNetwork::from_chain_id(chain_id).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<DeployError>(),
                Some(DeployError::UnknownNetwork(id)) if *id == chain_id
            ));
            assert_eq!(
                err.to_string(),
                format!("unknown Aragon deployment for network {chain_id}")
            );
        }
    }

    #[test]
    fn test_chain_id_round_trips_through_network() {
        for network in SupportedNetwork::iter() {
            assert_eq!(SupportedNetwork::from_chain_id(network.chain_id()).unwrap(), network);
        }
    }

    #[test]
    fn test_builtin_registry_covers_every_supported_network() {
        let registry = NetworkRegistry::builtin().expect("built-in table should parse");

        for network in SupportedNetwork::iter() {
            let deployment = registry
                .resolve(network, ProtocolVersion::V1_3_0)
                .unwrap_or_else(|| panic!("missing deployment for {network}"));
            assert_ne!(deployment.plugin_repo_factory, Address::ZERO);
            assert_ne!(deployment.plugin_repo_registry, Address::ZERO);
            assert_ne!(deployment.plugin_repo_factory, deployment.plugin_repo_registry);
        }
        assert_eq!(registry.entries().count(), 3);
    }

    #[test]
    fn test_resolve_chain_reports_missing_entry() {
        let err = NetworkRegistry::default()
            .resolve_chain(137, ProtocolVersion::V1_3_0)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::MissingNetworkDeployment {
                network: SupportedNetwork::Polygon,
                ..
            })
        ));
    }

    #[test]
    fn test_with_deployment_overrides_builtin_entry() {
        let custom = NetworkDeployment {
            plugin_repo_factory: address!("00000000000000000000000000000000000000fa"),
            plugin_repo_registry: address!("00000000000000000000000000000000000000fe"),
        };
        let registry = NetworkRegistry::builtin().unwrap().with_deployment(
            SupportedNetwork::Sepolia,
            ProtocolVersion::V1_3_0,
            custom,
        );

        assert_eq!(registry.resolve_chain(11155111, ProtocolVersion::V1_3_0).unwrap(), custom);
    }

    #[test]
    fn test_enum_string_forms() {
        assert_eq!(SupportedNetwork::Sepolia.to_string(), "sepolia");
        assert_eq!("polygon".parse::<SupportedNetwork>().unwrap(), SupportedNetwork::Polygon);
        assert_eq!(ProtocolVersion::V1_3_0.to_string(), "v1.3.0");
        assert_eq!("v1.3.0".parse::<ProtocolVersion>().unwrap(), ProtocolVersion::V1_3_0);
    }
}
