//! In-memory storage backend for testing

use crate::error::{StorageError, StorageResult};
use crate::traits::GraphStorage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage backend
///
/// Useful for testing and temporary storage.
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStorage for MemoryStorage {
    async fn save_flat(&self, key: &str, text: &str) -> StorageResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        entries.insert(key.to_string(), text.to_string());
        Ok(())
    }

    async fn load_flat(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(entries.remove(key).is_some())
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();

        storage.save_flat("PIPEGRAPH::a", "{}").await.unwrap();
        assert_eq!(
            storage.load_flat("PIPEGRAPH::a").await.unwrap().as_deref(),
            Some("{}")
        );

        // Overwrite
        storage
            .save_flat("PIPEGRAPH::a", "{\"V\":[]}")
            .await
            .unwrap();
        assert_eq!(
            storage.load_flat("PIPEGRAPH::a").await.unwrap().as_deref(),
            Some("{\"V\":[]}")
        );

        assert!(storage.delete("PIPEGRAPH::a").await.unwrap());
        assert!(storage.load_flat("PIPEGRAPH::a").await.unwrap().is_none());
        assert!(storage.keys().await.unwrap().is_empty());
    }
}
