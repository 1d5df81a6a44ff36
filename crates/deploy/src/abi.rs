//! Definitions of the Aragon OSx functions and events used during deployment

use alloy_core::primitives::Bytes;
use alloy_sol_types::sol;

sol! {
    /// `PluginRepoFactory`: creates a plugin repository and publishes its first build.
    #[derive(Debug, PartialEq, Eq)]
    function createPluginRepoWithFirstVersion(
        string subdomain,
        address pluginSetup,
        address maintainer,
        bytes releaseMetadata,
        bytes buildMetadata
    ) external returns (address pluginRepo);

    /// `PluginRepoFactory`: the registry new repositories are registered in.
    #[derive(Debug, PartialEq, Eq)]
    function pluginRepoRegistry() external view returns (address);

    /// `PluginRepoRegistry`: emitted once a repository is registered under a subdomain.
    #[derive(Debug, PartialEq, Eq)]
    event PluginRepoRegistered(string subdomain, address pluginRepo);
}

/// Placeholder release and build metadata; no real metadata is attached to the first version.
pub fn metadata_sentinel() -> Bytes {
    Bytes::from_static(&[0x01])
}
