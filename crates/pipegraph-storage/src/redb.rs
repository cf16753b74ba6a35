//! ReDB storage backend

use crate::error::{StorageError, StorageResult};
use crate::traits::GraphStorage;
use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Mutex;

const GRAPHS: TableDefinition<&str, &str> = TableDefinition::new("graphs");

/// ReDB storage backend
pub struct RedbStorage {
    db: Mutex<Database>,
}

impl RedbStorage {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path).map_err(|e| StorageError::Database(e.to_string()))?;

        // Create the table so read transactions can open it
        {
            let write_txn = db.begin_write()?;
            write_txn.open_table(GRAPHS)?;
            write_txn.commit()?;
        }

        tracing::debug!("Opened graph database at {}", path.display());
        Ok(Self { db: Mutex::new(db) })
    }
}

#[async_trait]
impl GraphStorage for RedbStorage {
    async fn save_flat(&self, key: &str, text: &str) -> StorageResult<()> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(GRAPHS)?;
            table.insert(key, text)?;
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn load_flat(&self, key: &str) -> StorageResult<Option<String>> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(GRAPHS)?;

        let text = table.get(key)?.map(|value| value.value().to_string());
        Ok(text)
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let write_txn = db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(GRAPHS)?;
            let removed = table.remove(key)?;
            removed.is_some()
        };
        write_txn.commit()?;

        Ok(existed)
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(GRAPHS)?;

        let mut keys = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            keys.push(key.value().to_string());
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipegraph_core::{EdgeRecord, Graph, VertexRecord};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_redb_storage() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        let storage = RedbStorage::open(&db_path).unwrap();

        let graph = Graph::from_records(
            vec![
                VertexRecord::new().with_id("a"),
                VertexRecord::new().with_id("b"),
            ],
            vec![EdgeRecord::new("a", "b", "next")],
        );
        storage.persist(&graph, Some("test")).await.unwrap();

        let restored = storage.depersist(Some("test")).await.unwrap().unwrap();
        assert_eq!(restored.to_flat(), graph.to_flat());
        assert_eq!(storage.list_names().await.unwrap(), vec!["test"]);

        assert!(storage.remove(Some("test")).await.unwrap());
        assert!(storage.depersist(Some("test")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redb_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("graphs.redb");

        {
            let storage = RedbStorage::open(&db_path).unwrap();
            storage.save_flat("PIPEGRAPH::graph", "{\"V\":[],\"E\":[]}").await.unwrap();
        }

        let storage = RedbStorage::open(&db_path).unwrap();
        let graph = storage.depersist(None).await.unwrap().unwrap();
        assert_eq!(graph.vertex_count(), 0);
    }
}
