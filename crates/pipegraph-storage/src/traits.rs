//! Storage backend trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use pipegraph_core::Graph;

/// Namespace prefix for every stored graph key
pub const KEY_PREFIX: &str = "PIPEGRAPH::";

/// Name used when none is given
pub const DEFAULT_GRAPH_NAME: &str = "graph";

/// Full key for a graph name, falling back to [`DEFAULT_GRAPH_NAME`]
pub fn storage_key(name: Option<&str>) -> String {
    format!("{}{}", KEY_PREFIX, name.unwrap_or(DEFAULT_GRAPH_NAME))
}

/// Key-value store for graphs in their flat text form
#[async_trait]
pub trait GraphStorage: Send + Sync {
    /// Store flat text under a full key, replacing any previous value
    async fn save_flat(&self, key: &str, text: &str) -> StorageResult<()>;

    /// Flat text stored under a full key
    async fn load_flat(&self, key: &str) -> StorageResult<Option<String>>;

    /// Remove a key; returns whether it existed
    async fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Every stored full key, sorted
    async fn keys(&self) -> StorageResult<Vec<String>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Graph Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize `graph` and store it under `name`
    async fn persist(&self, graph: &Graph, name: Option<&str>) -> StorageResult<()> {
        let key = storage_key(name);
        let text = graph.to_flat_string()?;
        tracing::debug!(
            "Persisting {} vertices and {} edges under {}",
            graph.vertex_count(),
            graph.edge_count(),
            key
        );
        self.save_flat(&key, &text).await
    }

    /// Rebuild the graph stored under `name`, if there is one
    async fn depersist(&self, name: Option<&str>) -> StorageResult<Option<Graph>> {
        let key = storage_key(name);
        match self.load_flat(&key).await? {
            Some(text) => Ok(Some(Graph::from_flat_str(&text)?)),
            None => {
                tracing::debug!("Nothing stored under {}", key);
                Ok(None)
            }
        }
    }

    /// Remove the graph stored under `name`
    async fn remove(&self, name: Option<&str>) -> StorageResult<bool> {
        self.delete(&storage_key(name)).await
    }

    /// Names of stored graphs, without the key prefix
    async fn list_names(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .keys()
            .await?
            .into_iter()
            .filter_map(|key| key.strip_prefix(KEY_PREFIX).map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::memory::MemoryStorage;
    use pipegraph_core::{EdgeRecord, VertexRecord};

    fn sample_graph() -> Graph {
        Graph::from_records(
            vec![
                VertexRecord::new().with_prop("name", "alice"),
                VertexRecord::new().with_id(10).with_prop("name", "bob"),
            ],
            vec![EdgeRecord::new(1, 10, "knows")],
        )
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key(None), "PIPEGRAPH::graph");
        assert_eq!(storage_key(Some("family")), "PIPEGRAPH::family");
    }

    #[tokio::test]
    async fn test_persist_and_depersist() {
        let storage = MemoryStorage::new();
        let graph = sample_graph();

        storage.persist(&graph, None).await.unwrap();
        let restored = storage.depersist(None).await.unwrap().unwrap();

        assert_eq!(restored.to_flat(), graph.to_flat());
        assert!(storage.depersist(Some("other")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_edge_with_reserved_attributes_reloads() {
        let storage = MemoryStorage::new();
        let mut graph = sample_graph();
        graph
            .add_edge(EdgeRecord::new(10, 1, "knows").with_prop("_in", 5))
            .unwrap();
        graph
            .add_edge(EdgeRecord::unlabeled(1, 10).with_prop("_label", "x"))
            .unwrap();

        storage.persist(&graph, None).await.unwrap();
        let restored = storage.depersist(None).await.unwrap().unwrap();

        assert_eq!(restored.to_flat(), graph.to_flat());
        assert_eq!(restored.edges().filter(|e| e.label().is_none()).count(), 1);
    }

    #[tokio::test]
    async fn test_named_graphs() {
        let storage = MemoryStorage::new();
        storage.persist(&sample_graph(), Some("family")).await.unwrap();
        storage.persist(&Graph::new(), None).await.unwrap();
        storage.save_flat("unrelated", "{}").await.unwrap();

        assert_eq!(storage.list_names().await.unwrap(), vec!["family", "graph"]);

        assert!(storage.remove(Some("family")).await.unwrap());
        assert!(!storage.remove(Some("family")).await.unwrap());
        assert_eq!(storage.list_names().await.unwrap(), vec!["graph"]);
    }

    #[tokio::test]
    async fn test_depersist_malformed_text() {
        let storage = MemoryStorage::new();
        storage
            .save_flat(&storage_key(None), "{\"V\": [")
            .await
            .unwrap();

        let err = storage.depersist(None).await.unwrap_err();
        assert!(matches!(err, StorageError::Graph(_)));
    }
}
