// JSON file store - one record file keyed by the application identifier
use crate::application::snapshot_store::SnapshotStore;
use crate::infrastructure::state_record::APP_KEY;
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode scoreboard record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            path: directory.as_ref().join(format!("{}.json", APP_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, action: &'static str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            action,
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> anyhow::Result<Option<Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error("read", e).into()),
        };

        // An unreadable file is treated like an empty one so startup never fails on it
        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable scoreboard file");
                Ok(None)
            }
        }
    }

    async fn save(&self, record: &Value) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error("create directory for", e))?;
        }

        let bytes = serde_json::to_vec_pretty(record).map_err(StoreError::from)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| self.io_error("write", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error("replace", e))?;

        tracing::debug!(path = %self.path.display(), "scoreboard saved");
        Ok(())
    }
}
