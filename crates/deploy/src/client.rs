//! [`Chain`] implementation over Ethereum JSON-RPC.
//!
//! Transactions are submitted with `eth_sendTransaction`, so signing happens on the
//! node side: an unlocked development account (Anvil, Hardhat) or a signing proxy in
//! front of the real endpoint.

use std::{path::PathBuf, time::Duration};

use alloy_core::primitives::{Address, B256, Bytes};
use anyhow::{Context, Result};
use backon::{ConstantBuilder, Retryable};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::{
    artifact::ArtifactStore,
    chain::{Chain, ChainSettings, DeployRequest, ExecuteRequest, TransactionReceipt},
    deployment_hash::{DeployedContract, DeploymentConfigHash},
    error::DeployError,
    rpc,
    store::FsDeploymentStore,
};

/// Default interval between receipt polls.
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of receipt polls before giving up.
pub const DEFAULT_RECEIPT_MAX_ATTEMPTS: usize = 180;

/// Connection parameters for [`RpcChain`].
#[derive(Debug, Clone)]
pub struct RpcChainConfig {
    pub rpc_url: Url,
    /// Sender used when a request does not override `from`.
    pub default_from: Address,
    /// If set, the endpoint must report this chain id.
    pub expected_chain_id: Option<u64>,
    /// Foundry output directory holding the contract artifacts.
    pub artifacts_dir: PathBuf,
    /// Directory for per-logical-id deployment caches, scoped by chain id below it.
    pub cache_dir: Option<PathBuf>,
    pub request_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub receipt_max_attempts: usize,
}

impl RpcChainConfig {
    pub fn new(rpc_url: Url, default_from: Address, artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            rpc_url,
            default_from,
            expected_chain_id: None,
            artifacts_dir: artifacts_dir.into(),
            cache_dir: None,
            request_timeout: rpc::DEFAULT_TIMEOUT,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
            receipt_max_attempts: DEFAULT_RECEIPT_MAX_ATTEMPTS,
        }
    }
}

/// Ask the endpoint for its chain id.
pub async fn query_chain_id(client: &reqwest::Client, rpc_url: &Url) -> Result<u64> {
    let chain_id: String = rpc::json_rpc_call(client, rpc_url.as_str(), "eth_chainId", vec![])
        .await
        .with_context(|| format!("Failed to query chain id from {rpc_url}"))?;
    rpc::parse_quantity(&chain_id)
}

/// A connected JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcChain {
    client: reqwest::Client,
    url: Url,
    settings: ChainSettings,
    artifacts: ArtifactStore,
    cache: Option<FsDeploymentStore>,
    receipt_poll_interval: Duration,
    receipt_max_attempts: usize,
}

impl RpcChain {
    /// Connect to the endpoint and read its chain id.
    pub async fn connect(config: RpcChainConfig) -> Result<Self> {
        let client = rpc::create_client(config.request_timeout)?;
        let chain_id = query_chain_id(&client, &config.rpc_url).await?;

        if let Some(expected) = config.expected_chain_id {
            if expected != chain_id {
                return Err(DeployError::ChainIdMismatch {
                    expected,
                    actual: chain_id,
                }
                .into());
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            chain_id,
            from = %config.default_from,
            "Connected to RPC endpoint"
        );

        let cache = config
            .cache_dir
            .map(|dir| FsDeploymentStore::for_chain(dir, chain_id).scoped("contracts"));

        Ok(Self {
            client,
            url: config.rpc_url,
            settings: ChainSettings {
                chain_id,
                default_from: config.default_from,
            },
            artifacts: ArtifactStore::new(config.artifacts_dir),
            cache,
            receipt_poll_interval: config.receipt_poll_interval,
            receipt_max_attempts: config.receipt_max_attempts,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        rpc::json_rpc_call(&self.client, self.url.as_str(), method, params).await
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        self.call("eth_getCode", vec![serde_json::json!(address), serde_json::json!("latest")])
            .await
    }

    /// Submit a transaction and wait until it is mined successfully.
    async fn transact(&self, tx: Value) -> Result<TransactionReceipt> {
        let tx_hash: B256 = self
            .call("eth_sendTransaction", vec![tx])
            .await
            .context("Failed to send transaction")?;

        tracing::debug!(tx_hash = %tx_hash, "Transaction sent, waiting for receipt");

        let receipt = self.wait_for_receipt(tx_hash).await?;
        if !receipt.succeeded() {
            return Err(DeployError::TransactionReverted { tx_hash }.into());
        }

        Ok(receipt)
    }

    /// Poll for the receipt while the node reports it pending. Any other failure ends the
    /// wait immediately and is returned as is.
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        let fetch = || async move {
            let receipt: Option<TransactionReceipt> = self
                .call("eth_getTransactionReceipt", vec![serde_json::json!(tx_hash)])
                .await?;
            receipt.ok_or_else(|| anyhow::Error::from(DeployError::ReceiptPending { tx_hash }))
        };

        fetch
            .retry(
                ConstantBuilder::default()
                    .with_delay(self.receipt_poll_interval)
                    .with_max_times(self.receipt_max_attempts),
            )
            .when(is_pending)
            .notify(|err: &anyhow::Error, retry_in: Duration| {
                tracing::trace!(error = %err, ?retry_in, "Receipt not available yet, retrying...");
            })
            .await
            .map_err(|err| {
                if is_pending(&err) {
                    err.context(format!(
                        "Timeout waiting for receipt of transaction {tx_hash} after {} polls",
                        self.receipt_max_attempts + 1
                    ))
                } else {
                    err
                }
            })
    }

    /// Return the cached deployment for `id` if it matches `config_hash` and still has code.
    async fn cached_deployment(&self, id: &str, config_hash: &str) -> Result<Option<Address>> {
        let Some(cache) = &self.cache else {
            return Ok(None);
        };
        let Some(cached) = cache.try_load::<DeployedContract>(id)? else {
            return Ok(None);
        };

        if cached.config_hash != config_hash {
            tracing::info!(id, "Deployment configuration changed, redeploying");
            return Ok(None);
        }

        if self.code_at(cached.address).await?.is_empty() {
            tracing::warn!(id, address = %cached.address, "Cached deployment has no code, redeploying");
            return Ok(None);
        }

        Ok(Some(cached.address))
    }
}

fn is_pending(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::ReceiptPending { .. })
    )
}

impl Chain for RpcChain {
    fn settings(&self) -> ChainSettings {
        self.settings
    }

    async fn deploy(&self, request: DeployRequest) -> Result<Address> {
        let bytecode = self.artifacts.bytecode(&request.contract)?;
        let sender = request.overrides.from.unwrap_or(self.settings.default_from);

        let config_hash = DeploymentConfigHash::new(
            self.settings.chain_id,
            &request.contract,
            &bytecode,
            &request.constructor_args,
            sender,
        )
        .compute_hash()?;

        if let Some(address) = self.cached_deployment(&request.id, &config_hash).await? {
            tracing::info!(id = %request.id, address = %address, "Contract already deployed, skipping deployment");
            return Ok(address);
        }

        let mut init_code = bytecode.to_vec();
        init_code.extend_from_slice(&request.constructor_args);
        let init_code = Bytes::from(init_code);
        let tx = request
            .overrides
            .to_transaction(self.settings.default_from, None, &init_code);

        tracing::info!(id = %request.id, contract = %request.contract, "Deploying contract...");
        let receipt = self
            .transact(tx)
            .await
            .with_context(|| format!("Failed to deploy {}", request.contract))?;

        let address = receipt.contract_address.with_context(|| {
            format!(
                "Receipt of {} carries no contract address",
                receipt.transaction_hash
            )
        })?;

        if let Some(cache) = &self.cache {
            cache.save(
                &request.id,
                &DeployedContract::new(address, config_hash, receipt.transaction_hash),
            )?;
        }

        tracing::info!(id = %request.id, address = %address, tx_hash = %receipt.transaction_hash, "Contract deployed");
        Ok(address)
    }

    async fn execute(&self, request: ExecuteRequest) -> Result<TransactionReceipt> {
        let tx = request.overrides.to_transaction(
            self.settings.default_from,
            Some(request.to),
            &request.calldata,
        );

        tracing::info!(to = %request.to, function = request.function, "Executing transaction...");
        let receipt = self
            .transact(tx)
            .await
            .with_context(|| format!("Failed to execute {} on {}", request.function, request.to))?;

        tracing::info!(
            function = request.function,
            tx_hash = %receipt.transaction_hash,
            logs = receipt.logs.len(),
            "Transaction mined"
        );
        Ok(receipt)
    }

    async fn static_call(&self, to: Address, calldata: Bytes) -> Result<Bytes> {
        let call = serde_json::json!({
            "from": self.settings.default_from,
            "to": to,
            "data": calldata,
        });

        self.call("eth_call", vec![call, serde_json::json!("latest")])
            .await
            .with_context(|| format!("eth_call to {to} failed"))
    }
}
