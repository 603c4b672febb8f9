// Store trait for the persisted scoreboard record
use async_trait::async_trait;
use serde_json::Value;

/// Key-value persistence boundary. The record is opaque JSON here; shaping
/// and lenient decoding live in `infrastructure::state_record`.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved record, `None` if nothing was saved yet
    async fn load(&self) -> anyhow::Result<Option<Value>>;

    /// Replace the saved record
    async fn save(&self, record: &Value) -> anyhow::Result<()>;
}
