use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use storage::Storage;
use tokio::sync::Mutex;

/// Slot-per-key snapshot persistence used to seed and mirror the word store.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    async fn read_snapshot(&self, key: &str) -> Result<Option<String>>;
    async fn write_snapshot(&self, key: &str, snapshot: &str) -> Result<()>;
}

#[async_trait]
impl SnapshotCache for Storage {
    async fn read_snapshot(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_cached(key).await?.map(|entry| entry.value))
    }

    async fn write_snapshot(&self, key: &str, snapshot: &str) -> Result<()> {
        self.put_cached(key, snapshot).await
    }
}

/// Process-local cache that forgets everything on exit.
#[derive(Default)]
pub struct EphemeralCache {
    slots: Mutex<HashMap<String, String>>,
}

impl EphemeralCache {
    pub fn with_snapshot(key: impl Into<String>, snapshot: impl Into<String>) -> Self {
        Self {
            slots: Mutex::new(HashMap::from([(key.into(), snapshot.into())])),
        }
    }
}

#[async_trait]
impl SnapshotCache for EphemeralCache {
    async fn read_snapshot(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.lock().await.get(key).cloned())
    }

    async fn write_snapshot(&self, key: &str, snapshot: &str) -> Result<()> {
        self.slots
            .lock()
            .await
            .insert(key.to_string(), snapshot.to_string());
        Ok(())
    }
}
