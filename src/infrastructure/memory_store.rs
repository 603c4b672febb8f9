// In-memory store, used when no storage directory is configured
use crate::application::snapshot_store::SnapshotStore;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<Value>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_record(record: Value) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> anyhow::Result<Option<Value>> {
        Ok(self.record.lock().await.clone())
    }

    async fn save(&self, record: &Value) -> anyhow::Result<()> {
        *self.record.lock().await = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_replaces_record() {
        let store = MemoryStore::default();
        assert_eq!(store.load().await.unwrap(), None);

        store.save(&json!({ "player1_score": 1 })).await.unwrap();
        store.save(&json!({ "player1_score": 2 })).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(json!({ "player1_score": 2 })));
    }
}
