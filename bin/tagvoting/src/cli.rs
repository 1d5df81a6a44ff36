use std::path::PathBuf;

use alloy_core::primitives::Address;
use clap::{Args, Parser, Subcommand};
use tagvoting_deploy::EventPolicy;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "tagvoting")]
#[command(
    author,
    version,
    about = "Deploy the TagVoting plugin into an Aragon OSx plugin repository"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "TAGVOTING_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to the configuration file.
    ///
    /// Defaults to ./TagVoting.toml when it exists. Values from `TAGVOTING_*` environment
    /// variables and from the flags below take precedence over the file.
    #[arg(short, long, alias = "conf", env = "TAGVOTING_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where to connect and who sends the transactions.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// The URL of the JSON-RPC endpoint.
    #[arg(long, alias = "rpc", global = true)]
    pub rpc_url: Option<String>,

    /// The expected chain id.
    ///
    /// Lets `show` and `deploy --use-cached` work without contacting the endpoint.
    #[arg(long, global = true)]
    pub chain_id: Option<u64>,

    /// The default transaction sender. Must be unlocked on the node.
    #[arg(long, global = true)]
    pub from: Option<Address>,

    /// Derive the default sender from this private key.
    #[arg(long, global = true)]
    pub private_key: Option<String>,

    /// Derive the default sender from this mnemonic.
    #[arg(long, global = true)]
    pub mnemonic: Option<String>,

    /// Derivation index used with `--mnemonic`.
    #[arg(long, global = true)]
    pub mnemonic_index: Option<u32>,

    /// The Foundry output directory holding the contract artifacts.
    #[arg(long, global = true)]
    pub artifacts: Option<PathBuf>,

    /// The directory deployment records are written to.
    #[arg(long, alias = "outdata", global = true)]
    pub outdata: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy TagVotingSetup and register its plugin repository.
    Deploy(DeployArgs),
    /// Print the persisted deployment of the connected chain.
    Show,
    /// List the supported networks and their Aragon OSx singletons.
    Networks,
    /// Write the effective configuration to a TOML file.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct DeployArgs {
    /// Run a fresh deployment even if a record exists.
    #[arg(long, conflicts_with = "use_cached")]
    pub redeploy: bool,

    /// Return the persisted record without contacting the endpoint. Requires `--chain-id`.
    #[arg(long)]
    pub use_cached: bool,

    /// The plugin repository subdomain.
    #[arg(long)]
    pub subdomain: Option<String>,

    /// The plugin repository maintainer. Defaults to the sender.
    #[arg(long)]
    pub maintainer: Option<Address>,

    /// How to treat several `PluginRepoRegistered` events in one transaction.
    #[arg(long)]
    pub event_policy: Option<EventPolicy>,
}

#[derive(Debug, Clone, Args)]
pub struct InitConfigArgs {
    /// Where to write the file.
    #[arg(long, default_value = tagvoting_deploy::DEFAULT_CONFIG_FILENAME)]
    pub path: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}
