//! Compiled contract artifacts.

use std::{path::PathBuf, str::FromStr};

use alloy_core::primitives::Bytes;
use anyhow::{Context, Result};
use serde_json::Value;

/// Reads creation bytecode from a Foundry output directory
/// (`<dir>/<Contract>.sol/<Contract>.json`).
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn artifact_path(&self, contract: &str) -> PathBuf {
        self.dir
            .join(format!("{contract}.sol"))
            .join(format!("{contract}.json"))
    }

    /// The creation bytecode of `contract`.
    pub fn bytecode(&self, contract: &str) -> Result<Bytes> {
        let path = self.artifact_path(contract);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read artifact for {contract} at {}", path.display()))?;
        let artifact: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))?;

        parse_bytecode(&artifact).with_context(|| format!("Invalid artifact {}", path.display()))
    }
}

/// Extract creation bytecode from either `bytecode.object` (Foundry) or a plain
/// `bytecode` string (Hardhat).
fn parse_bytecode(artifact: &Value) -> Result<Bytes> {
    let hex = match artifact.get("bytecode") {
        Some(Value::String(hex)) => hex.as_str(),
        Some(bytecode) => bytecode
            .get("object")
            .and_then(Value::as_str)
            .context("`bytecode.object` is missing")?,
        None => anyhow::bail!("`bytecode` is missing"),
    };

    if hex.contains("__$") {
        anyhow::bail!("Bytecode has unlinked library placeholders");
    }

    let bytecode = Bytes::from_str(hex).context("Bytecode is not valid hex")?;
    if bytecode.is_empty() {
        anyhow::bail!("Bytecode is empty; abstract contracts and interfaces cannot be deployed");
    }

    Ok(bytecode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_parse_foundry_layout() {
        let artifact = serde_json::json!({
            "abi": [],
            "bytecode": { "object": "0x6080604052", "linkReferences": {} }
        });
        assert_eq!(
            parse_bytecode(&artifact).unwrap(),
            Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52])
        );
    }

    #[test]
    fn test_parse_plain_bytecode_string() {
        let artifact = serde_json::json!({ "bytecode": "0x6001" });
        assert_eq!(parse_bytecode(&artifact).unwrap(), Bytes::from_static(&[0x60, 0x01]));
    }

    #[test]
    fn test_rejects_unusable_bytecode() {
        for artifact in [
            serde_json::json!({ "abi": [] }),
            serde_json::json!({ "bytecode": { "object": "0x" } }),
            serde_json::json!({ "bytecode": "0xnothex" }),
            serde_json::json!({ "bytecode": "0x73__$abcdef$__" }),
        ] {
            assert!(parse_bytecode(&artifact).is_err(), "{artifact} should be rejected");
        }
    }

    #[test]
    fn test_reads_from_output_directory() {
        let temp_dir = TempDir::new("tagvoting-artifacts").expect("Failed to create temp dir");
        let store = ArtifactStore::new(temp_dir.path());
        let path = store.artifact_path("TagVotingSetup");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"bytecode":{"object":"0x60016002"}}"#).unwrap();

        assert_eq!(
            store.bytecode("TagVotingSetup").unwrap(),
            Bytes::from_static(&[0x60, 0x01, 0x60, 0x02])
        );
        assert!(store.bytecode("Missing").is_err());
    }
}
