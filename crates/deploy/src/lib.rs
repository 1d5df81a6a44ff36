//! tagvoting-deploy - Deployment library for the TagVoting Aragon OSx plugin.
//!
//! This crate deploys the `TagVotingSetup` contract and registers it as the first
//! version of a new plugin repository through the Aragon `PluginRepoFactory`.

mod abi;
pub use abi::{
    PluginRepoRegistered, createPluginRepoWithFirstVersionCall, metadata_sentinel,
    pluginRepoRegistryCall,
};

mod artifact;
pub use artifact::ArtifactStore;

mod chain;
pub use chain::{
    Chain, ChainSettings, DeployRequest, ExecuteRequest, Log, TransactionReceipt, TxOverrides,
};

mod client;
pub use client::{
    DEFAULT_RECEIPT_MAX_ATTEMPTS, DEFAULT_RECEIPT_POLL_INTERVAL, RpcChain, RpcChainConfig,
    query_chain_id,
};

mod config;
pub use config::{DEFAULT_CONFIG_FILENAME, DEFAULT_RPC_URL, DeployConfig};

mod deployer;
pub use deployer::{DeploymentOrchestrator, DeploymentRecord, LATEST_DEPLOYMENT};

mod deployment_hash;
pub use deployment_hash::{DeployedContract, DeploymentConfigHash};

mod error;
pub use error::DeployError;

mod network;
pub use network::{NetworkDeployment, NetworkRegistry, ProtocolVersion, SupportedNetwork};

mod repo;
pub use repo::{
    RepoRegistrar, RepoRegistration, registered_repos, validate_subdomain, verify_factory_registry,
};

pub mod rpc;

mod settings;
pub use settings::{DEFAULT_SUBDOMAIN, DeploymentSettings, EventPolicy, RepoSettings, SetupSettings};

mod setup;
pub use setup::{SetupDeployer, TAG_VOTING_SETUP_CONTRACT, TAG_VOTING_SETUP_ID};

mod signer;
pub use signer::{DEV_MNEMONIC, SenderSource};

mod store;
pub use store::FsDeploymentStore;
