//! Named deployment records on disk.
//!
//! Records are JSON files `<root>/<name>.json`. Writes go through a temporary file
//! and a rename so a record is either absent or complete.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::DeployError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsDeploymentStore {
    root: PathBuf,
}

impl FsDeploymentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// A store scoped to one chain, so records of different networks never collide.
    pub fn for_chain(outdata: impl AsRef<Path>, chain_id: u64) -> Self {
        Self::new(outdata.as_ref().join(chain_id.to_string()))
    }

    /// A nested store below this one.
    pub fn scoped(&self, name: &str) -> Self {
        Self::new(self.root.join(name))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// Load a record, failing with [`DeployError::MissingRecord`] if it was never saved.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.path(name);
        if !path.exists() {
            return Err(DeployError::MissingRecord {
                name: name.to_string(),
                path,
            }
            .into());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read deployment record {}", path.display()))?;
        let record = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse deployment record {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Deployment record loaded");
        Ok(record)
    }

    /// Load a record if present.
    pub fn try_load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        if !self.exists(name) {
            return Ok(None);
        }
        self.load(name).map(Some)
    }

    /// Save a record, replacing any previous version atomically.
    pub fn save<T: Serialize>(&self, name: &str, record: &T) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create deployments directory {}", self.root.display())
        })?;

        let json =
            serde_json::to_string_pretty(record).context("Failed to serialize deployment record")?;

        let path = self.path(name);
        let tmp_path = self.root.join(format!(".{name}.json.tmp"));
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to move deployment record into {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Deployment record saved");
        Ok(path)
    }
}
