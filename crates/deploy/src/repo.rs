//! Creation and registration of the TagVoting plugin repository.

use alloy_core::primitives::{Address, Bytes};
use alloy_sol_types::{SolCall, SolEvent};
use anyhow::{Context, Result};

use crate::{
    abi::{
        PluginRepoRegistered, createPluginRepoWithFirstVersionCall, metadata_sentinel,
        pluginRepoRegistryCall,
    },
    chain::{Chain, ExecuteRequest, Log, TxOverrides},
    error::DeployError,
    network::NetworkDeployment,
    settings::EventPolicy,
};

/// Everything the factory call needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRegistration {
    pub plugin_repo_factory: Address,
    pub plugin_repo_registry: Address,
    pub plugin_setup: Address,
    pub subdomain: String,
    pub maintainer: Address,
    pub overrides: TxOverrides,
}

impl RepoRegistration {
    /// Calldata for `createPluginRepoWithFirstVersion`, with sentinel release and build metadata.
    pub fn calldata(&self) -> Bytes {
        createPluginRepoWithFirstVersionCall {
            subdomain: self.subdomain.clone(),
            pluginSetup: self.plugin_setup,
            maintainer: self.maintainer,
            releaseMetadata: metadata_sentinel(),
            buildMetadata: metadata_sentinel(),
        }
        .abi_encode()
        .into()
    }
}

/// Check a subdomain against the registry's rule: non-empty, only `a-z`, `0-9` and `-`.
pub fn validate_subdomain(subdomain: &str) -> Result<()> {
    let valid = !subdomain.is_empty()
        && subdomain
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');

    if !valid {
        return Err(DeployError::InvalidSubdomain(subdomain.to_string()).into());
    }
    Ok(())
}

/// Decode every `PluginRepoRegistered` event emitted by `registry`, in log order.
///
/// Logs from other addresses, with another signature, or that fail to decode are skipped.
pub fn registered_repos(logs: &[Log], registry: Address) -> Vec<PluginRepoRegistered> {
    logs.iter()
        .filter(|log| log.address == registry)
        .filter(|log| log.topics.first() == Some(&PluginRepoRegistered::SIGNATURE_HASH))
        .filter_map(|log| {
            PluginRepoRegistered::decode_raw_log(log.topics.iter().copied(), &log.data, true)
                .inspect_err(|err| {
                    tracing::debug!(error = %err, "Skipping undecodable PluginRepoRegistered log");
                })
                .ok()
        })
        .collect()
}

/// Check that `deployment.plugin_repo_factory` registers into `deployment.plugin_repo_registry`.
///
/// Registration events are only looked up at the configured registry, so a wrong registry
/// would create the repository on chain and then fail to find it. The check reads the
/// factory's `pluginRepoRegistry()` and sends no transaction.
pub async fn verify_factory_registry<C: Chain>(chain: &C, deployment: &NetworkDeployment) -> Result<()> {
    let factory = deployment.plugin_repo_factory;
    let returned = chain
        .static_call(factory, pluginRepoRegistryCall {}.abi_encode().into())
        .await
        .with_context(|| format!("Failed to query PluginRepoFactory {factory}"))?;

    let actual = pluginRepoRegistryCall::abi_decode_returns(&returned, true)
        .with_context(|| format!("No PluginRepoFactory deployed at {factory}"))?
        ._0;

    if actual != deployment.plugin_repo_registry {
        return Err(DeployError::RegistryMismatch {
            factory,
            expected: deployment.plugin_repo_registry,
            actual,
        }
        .into());
    }

    tracing::debug!(factory = %factory, registry = %actual, "PluginRepoFactory registry verified");
    Ok(())
}

/// Calls the plugin repo factory and recovers the new repository from the registry event.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepoRegistrar {
    policy: EventPolicy,
}

impl RepoRegistrar {
    pub fn new(policy: EventPolicy) -> Self {
        Self { policy }
    }

    /// Create the repository and return its address.
    pub async fn register<C: Chain>(&self, chain: &C, registration: RepoRegistration) -> Result<Address> {
        validate_subdomain(&registration.subdomain)?;

        tracing::info!(
            subdomain = %registration.subdomain,
            plugin_setup = %registration.plugin_setup,
            maintainer = %registration.maintainer,
            factory = %registration.plugin_repo_factory,
            "Creating plugin repo..."
        );

        let receipt = chain
            .execute(ExecuteRequest {
                to: registration.plugin_repo_factory,
                function: "createPluginRepoWithFirstVersion",
                calldata: registration.calldata(),
                overrides: registration.overrides.clone(),
            })
            .await?;

        let events = registered_repos(&receipt.logs, registration.plugin_repo_registry);
        let event = self
            .select(events)
            .with_context(|| format!("Registration transaction {}", receipt.transaction_hash))?;

        if event.subdomain != registration.subdomain {
            tracing::warn!(
                requested = %registration.subdomain,
                registered = %event.subdomain,
                "Registry reported a different subdomain"
            );
        }

        tracing::info!(tag_voting_repo = %event.pluginRepo, "Plugin repo registered");
        Ok(event.pluginRepo)
    }

    fn select(&self, events: Vec<PluginRepoRegistered>) -> Result<PluginRepoRegistered> {
        let count = events.len();
        if count > 1 {
            if self.policy == EventPolicy::ExactlyOne {
                return Err(DeployError::AmbiguousRegistration(count).into());
            }
            tracing::warn!(count, "Several PluginRepoRegistered events emitted, using the first");
        }

        events
            .into_iter()
            .next()
            .ok_or_else(|| DeployError::EventNotEmitted.into())
    }
}
