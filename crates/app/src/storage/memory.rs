//! In-memory state store.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::storage::{StateKey, StateStore, StorageError};

/// State held in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: RwLock<FxHashMap<StateKey, Value>>,
}

impl MemoryStateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, key: StateKey) -> Result<Option<Value>, StorageError> {
        Ok(self.values.read().await.get(&key).cloned())
    }

    async fn save(&self, key: StateKey, value: Value) -> Result<(), StorageError> {
        self.values.write().await.insert(key, value);

        Ok(())
    }

    async fn remove(&self, key: StateKey) -> Result<(), StorageError> {
        self.values.write().await.remove(&key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn keys_are_independent() -> TestResult {
        let store = MemoryStateStore::new();

        store.save(StateKey::Cart, json!({ "lines": [] })).await?;
        store.save(StateKey::CheckoutSession, json!({ "step": "shipping" })).await?;
        store.remove(StateKey::Cart).await?;

        assert_eq!(store.load(StateKey::Cart).await?, None);
        assert_eq!(
            store.load(StateKey::CheckoutSession).await?,
            Some(json!({ "step": "shipping" }))
        );

        Ok(())
    }
}
