//! tagvoting deploys the TagVoting plugin setup and publishes it as a new Aragon OSx
//! plugin repository.

mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::Table;

use cli::{Cli, Command, InitConfigArgs};
use tagvoting_deploy::{
    Chain, DeployConfig, DeploymentRecord, LATEST_DEPLOYMENT, NetworkRegistry, RpcChain,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    if let Command::Networks = cli.command {
        print_networks(&NetworkRegistry::builtin()?);
        return Ok(());
    }

    let mut config = config::load(cli.config.as_deref())?;
    cli.connection.apply(&mut config);

    match cli.command {
        Command::Deploy(args) => {
            args.apply(&mut config)?;
            deploy(config).await
        }
        Command::Show => show(config).await,
        Command::InitConfig(args) => init_config(config, args),
        Command::Networks => Ok(()),
    }
}

async fn deploy(config: DeployConfig) -> Result<()> {
    let networks = NetworkRegistry::builtin()?;

    let record = if config.deployment.uses_cached_record() {
        config.cached_deployment(networks)?
    } else {
        let chain = RpcChain::connect(config.rpc_chain_config()?).await?;
        config
            .orchestrator(networks, chain.settings().chain_id)
            .deploy(&chain)
            .await?
    };

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn show(config: DeployConfig) -> Result<()> {
    let chain_id = config.resolve_chain_id().await?;
    let store = config.store(chain_id);
    let record: DeploymentRecord = store.load(LATEST_DEPLOYMENT)?;

    let mut table = Table::new();
    table.set_header(vec!["Contract", "Address"]);
    table.add_row(vec!["TagVotingSetup".to_string(), record.tag_voting_setup.to_string()]);
    table.add_row(vec!["TagVoting plugin repo".to_string(), record.tag_voting_repo.to_string()]);

    println!("Chain {chain_id} ({})", store.path(LATEST_DEPLOYMENT).display());
    println!("{table}");
    Ok(())
}

fn print_networks(networks: &NetworkRegistry) {
    let mut table = Table::new();
    table.set_header(vec![
        "Network",
        "Chain ID",
        "Version",
        "PluginRepoFactory",
        "PluginRepoRegistry",
    ]);

    for (network, version, deployment) in networks.entries() {
        table.add_row(vec![
            network.to_string(),
            network.chain_id().to_string(),
            version.to_string(),
            deployment.plugin_repo_factory.to_string(),
            deployment.plugin_repo_registry.to_string(),
        ]);
    }

    println!("{table}");
}

fn init_config(config: DeployConfig, args: InitConfigArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite it",
            args.path.display()
        );
    }

    config
        .save_to_file(&args.path)
        .with_context(|| format!("Failed to write {}", args.path.display()))?;
    println!("{}", args.path.display());
    Ok(())
}
