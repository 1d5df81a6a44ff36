//! Typed deployment failures.
//!
//! Public functions return [`anyhow::Result`]; the variants below travel inside the
//! [`anyhow::Error`] so callers can tell configuration problems, failed transactions
//! and protocol mismatches apart with `downcast_ref::<DeployError>()`.

use std::path::PathBuf;

use alloy_core::primitives::{Address, B256};

use crate::network::{ProtocolVersion, SupportedNetwork};

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The chain id is not part of the closed set of supported networks.
    #[error("unknown Aragon deployment for network {0}")]
    UnknownNetwork(u64),

    /// The network is supported but no singletons are recorded for the version.
    #[error("no Aragon {version} deployment recorded for {network}")]
    MissingNetworkDeployment {
        network: SupportedNetwork,
        version: ProtocolVersion,
    },

    #[error("invalid plugin repo subdomain {0:?}: expected a non-empty label of [a-z0-9-]")]
    InvalidSubdomain(String),

    #[error("no persisted deployment named `{name}` at {}", path.display())]
    MissingRecord { name: String, path: PathBuf },

    #[error("RPC endpoint reports chain id {actual}, configuration expects {expected}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("a chain id is required to use the persisted deployment without contacting the endpoint")]
    ChainIdRequired,

    /// The factory reports a different registry than the one the deployment was resolved with.
    #[error("PluginRepoFactory {factory} uses registry {actual}, configuration expects {expected}")]
    RegistryMismatch {
        factory: Address,
        expected: Address,
        actual: Address,
    },

    #[error("no transaction sender configured: set `from`, `private_key` or `mnemonic`")]
    MissingSender,

    #[error("transaction {tx_hash} reverted")]
    TransactionReverted { tx_hash: B256 },

    /// The receipt is not available yet. Only this error is retried while polling.
    #[error("transaction {tx_hash} is still pending")]
    ReceiptPending { tx_hash: B256 },

    /// The transaction succeeded but the registry did not report a new repository.
    #[error("PluginRepoRegistered event not emitted")]
    EventNotEmitted,

    #[error("expected exactly one PluginRepoRegistered event, found {0}")]
    AmbiguousRegistration(usize),
}
