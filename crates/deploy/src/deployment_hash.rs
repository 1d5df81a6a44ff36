use alloy_core::primitives::{Address, B256, Bytes, keccak256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Inputs that determine a contract deployment.
///
/// When any of these change for a logical id, the cached deployment is stale and the
/// contract is deployed again. Gas and nonce overrides are excluded: they change how
/// the transaction is sent, not what ends up on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfigHash {
    pub chain_id: u64,
    pub contract: String,
    /// keccak256 of the creation bytecode.
    pub bytecode_hash: B256,
    pub constructor_args: Bytes,
    pub deployer: Address,
}

impl DeploymentConfigHash {
    pub fn new(
        chain_id: u64,
        contract: &str,
        bytecode: &Bytes,
        constructor_args: &Bytes,
        deployer: Address,
    ) -> Self {
        Self {
            chain_id,
            contract: contract.to_string(),
            bytecode_hash: keccak256(bytecode),
            constructor_args: constructor_args.clone(),
            deployer,
        }
    }

    /// Compute a SHA-256 hash of this configuration.
    ///
    /// The configuration is serialized to JSON in field order before hashing, so the same
    /// configuration always produces the same hash.
    pub fn compute_hash(&self) -> Result<String> {
        let json =
            serde_json::to_string(self).context("Failed to serialize deployment configuration")?;

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());

        Ok(hex::encode(hasher.finalize()))
    }
}

/// Cache entry stored per logical id after a successful contract deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub address: Address,
    pub config_hash: String,
    pub transaction_hash: B256,
    /// Unix timestamp of the deployment.
    pub deployed_at: i64,
    /// Version of this tool that made the deployment.
    pub tool_version: String,
}

impl DeployedContract {
    pub fn new(address: Address, config_hash: String, transaction_hash: B256) -> Self {
        Self {
            address,
            config_hash,
            transaction_hash,
            deployed_at: chrono::Utc::now().timestamp(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsDeploymentStore;
    use alloy_core::primitives::address;
    use tempdir::TempDir;

    fn sample() -> DeploymentConfigHash {
        DeploymentConfigHash::new(
            11155111,
            "TagVotingSetup",
            &Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]),
            &Bytes::new(),
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
        )
    }

    #[test]
    fn test_hash_determinism() {
        let hash1 = sample().compute_hash().unwrap();
        let hash2 = sample().compute_hash().unwrap();

        assert_eq!(hash1, hash2, "Hash should be deterministic");
        assert_eq!(hash1.len(), 64, "SHA-256 hash should be 64 hex characters");
    }

    #[test]
    fn test_hash_changes_with_chain_id() {
        let mut other = sample();
        other.chain_id = 137;

        assert_ne!(sample().compute_hash().unwrap(), other.compute_hash().unwrap());
    }

    #[test]
    fn test_hash_changes_with_bytecode() {
        let other = DeploymentConfigHash::new(
            11155111,
            "TagVotingSetup",
            &Bytes::from_static(&[0x60, 0x80, 0x60, 0x41]),
            &Bytes::new(),
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
        );

        assert_ne!(sample().compute_hash().unwrap(), other.compute_hash().unwrap());
    }

    #[test]
    fn test_hash_changes_with_constructor_args() {
        let mut other = sample();
        other.constructor_args = Bytes::from_static(&[0x01]);

        assert_ne!(sample().compute_hash().unwrap(), other.compute_hash().unwrap());
    }

    #[test]
    fn test_hash_changes_with_deployer() {
        let mut other = sample();
        other.deployer = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");

        assert_ne!(sample().compute_hash().unwrap(), other.compute_hash().unwrap());
    }

    #[test]
    fn test_deployed_contract_round_trips_through_store() {
        let temp_dir = TempDir::new("tagvoting-test").expect("Failed to create temp dir");
        let store = FsDeploymentStore::new(temp_dir.path());

        let original = DeployedContract {
            address: address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
            config_hash: sample().compute_hash().unwrap(),
            transaction_hash: B256::repeat_byte(0x11),
            deployed_at: 1737316800,
            tool_version: "0.1.0".to_string(),
        };
        store.save("TagVotingSetup", &original).unwrap();

        let loaded: DeployedContract = store.load("TagVotingSetup").unwrap();
        assert_eq!(original, loaded);
    }
}
