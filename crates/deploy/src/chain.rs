//! The deployment framework seen from the orchestrator.
//!
//! [`Chain`] is the narrow interface the deployment steps are written against:
//! deploy a named contract, execute a call, read contract state, and report the active
//! chain settings.
//! [`crate::RpcChain`] implements it over JSON-RPC; tests substitute an in-memory chain.

use std::future::Future;

use alloy_core::primitives::{Address, B256, Bytes};
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::rpc::{deserialize_opt_u64_from_hex, to_quantity};

/// Explicit replacement for ambient "default chain id / default sender" settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSettings {
    /// The chain id of the connected network.
    pub chain_id: u64,
    /// The sender used when a request does not override `from`.
    pub default_from: Address,
}

/// Per-transaction overrides. Unset fields are left to the node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

impl TxOverrides {
    /// Build the `eth_sendTransaction` object for this transaction.
    pub fn to_transaction(
        &self,
        default_from: Address,
        to: Option<Address>,
        data: &Bytes,
    ) -> serde_json::Value {
        let mut tx = serde_json::json!({
            "from": self.from.unwrap_or(default_from),
            "data": data,
        });

        if let Some(to) = to {
            tx["to"] = serde_json::json!(to);
        }
        if let Some(gas) = self.gas {
            tx["gas"] = serde_json::json!(to_quantity(gas));
        }
        if let Some(gas_price) = self.gas_price {
            tx["gasPrice"] = serde_json::json!(to_quantity(gas_price));
        }
        if let Some(nonce) = self.nonce {
            tx["nonce"] = serde_json::json!(to_quantity(nonce));
        }

        tx
    }
}

/// A contract creation identified by a logical id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Logical id the framework caches the deployment under.
    pub id: String,
    /// Name of the compiled contract artifact.
    pub contract: String,
    /// ABI-encoded constructor arguments, appended to the creation bytecode.
    pub constructor_args: Bytes,
    pub overrides: TxOverrides,
}

/// A state-changing call to a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteRequest {
    pub to: Address,
    /// Function name, for logs only.
    pub function: &'static str,
    /// ABI-encoded calldata including the selector.
    pub calldata: Bytes,
    pub overrides: TxOverrides,
}

/// A raw log entry from a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// The subset of a transaction receipt the deployment steps need.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    /// `1` on success, `0` on revert. Pre-Byzantium receipts carry no status.
    #[serde(default, deserialize_with = "deserialize_opt_u64_from_hex")]
    pub status: Option<u64>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status != Some(0)
    }
}

/// The deployment framework: contract creation, calls and chain settings.
///
/// Implementations own transaction signing, broadcast and confirmation. Failures are
/// returned unmodified to the caller; the deployment steps never retry.
pub trait Chain {
    /// The active chain id and default sender.
    fn settings(&self) -> ChainSettings;

    /// Deploy (or reuse a cached deployment of) a contract, returning its address.
    fn deploy(&self, request: DeployRequest) -> impl Future<Output = Result<Address>> + Send;

    /// Submit a call and wait for its receipt. A reverted transaction is an error.
    fn execute(
        &self,
        request: ExecuteRequest,
    ) -> impl Future<Output = Result<TransactionReceipt>> + Send;

    /// Evaluate a call against the latest block without sending a transaction.
    fn static_call(
        &self,
        to: Address,
        calldata: Bytes,
    ) -> impl Future<Output = Result<Bytes>> + Send;
}
