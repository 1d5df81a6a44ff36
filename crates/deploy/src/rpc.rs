//! Shared RPC utilities for interacting with Ethereum JSON-RPC endpoints.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// Default timeout for RPC requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client(timeout: Duration) -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

#[derive(Deserialize)]
struct RpcResponse {
    /// `null` for pending lookups; a missing member reads the same.
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// POST a JSON-RPC 2.0 request and deserialize its `result`.
///
/// An `error` member becomes an `anyhow` error carrying the RPC code and message.
/// A `null` result deserializes into `None` when `T` is an `Option`.
pub async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Vec<Value>,
) -> Result<T, anyhow::Error> {
    let request = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });

    let response: RpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .with_context(|| format!("{method} request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("{method} request rejected by {url}"))?
        .json()
        .await
        .with_context(|| format!("Malformed {method} response"))?;

    if let Some(RpcErrorObject { code, message }) = response.error {
        anyhow::bail!("{method} failed with RPC error {code}: {message}");
    }

    serde_json::from_value(response.result).with_context(|| format!("Unexpected {method} result"))
}

/// Encode a number as a JSON-RPC quantity (`0x`-prefixed, no leading zeros).
pub fn to_quantity(value: impl Into<u128>) -> String {
    format!("0x{:x}", value.into())
}

/// Parse a JSON-RPC quantity into a `u64`.
pub fn parse_quantity(s: &str) -> Result<u64, anyhow::Error> {
    let digits = s
        .strip_prefix("0x")
        .with_context(|| format!("Quantity {s:?} is missing its 0x prefix"))?;
    u64::from_str_radix(digits, 16).with_context(|| format!("Invalid quantity {s:?}"))
}

/// Deserialize an optional hex quantity, treating `null` or a missing field as `None`.
pub(crate) fn deserialize_opt_u64_from_hex<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Deserialize::deserialize(deserializer)?;
    s.map(|s| parse_quantity(&s).map_err(serde::de::Error::custom))
        .transpose()
}
