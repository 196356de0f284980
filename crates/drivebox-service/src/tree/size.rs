//! Recursive size aggregation.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use drivebox_core::types::size::format_size;
use drivebox_core::AppResult;
use drivebox_database::NodeStore;
use drivebox_entity::Node;

/// Aggregated usage figure with its display form.
#[derive(Debug, Clone, Serialize)]
pub struct StorageUsage {
    pub raw_bytes: u64,
    pub formatted: String,
}

impl StorageUsage {
    pub fn from_bytes(raw_bytes: u64) -> Self {
        Self {
            formatted: format_size(raw_bytes),
            raw_bytes,
        }
    }
}

/// Computes recursive sizes over the node store.
#[derive(Clone)]
pub struct SizeAggregator {
    nodes: Arc<dyn NodeStore>,
}

impl std::fmt::Debug for SizeAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeAggregator").finish_non_exhaustive()
    }
}

impl SizeAggregator {
    pub fn new(nodes: Arc<dyn NodeStore>) -> Self {
        Self { nodes }
    }

    /// Total bytes of every file underneath a folder.
    pub async fn subtree_size(&self, folder_id: Uuid) -> AppResult<u64> {
        let descendants = self.nodes.descendants(folder_id).await?;
        Ok(descendants
            .iter()
            .filter(|n| n.is_file())
            .map(|n| n.size_bytes.unwrap_or(0).max(0) as u64)
            .sum())
    }

    /// Size of a node: its own bytes for a file, the recursive total for
    /// a folder.
    pub async fn size_of(&self, node: &Node) -> AppResult<u64> {
        if node.is_file() {
            Ok(node.size_bytes.unwrap_or(0).max(0) as u64)
        } else {
            self.subtree_size(node.id).await
        }
    }

    /// Usage of a node as a display-ready figure.
    pub async fn usage_of(&self, node: &Node) -> AppResult<StorageUsage> {
        Ok(StorageUsage::from_bytes(self.size_of(node).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivebox_database::MemoryNodeStore;
    use drivebox_entity::CreateNode;

    #[tokio::test]
    async fn test_subtree_size_sums_nested_files() {
        let nodes = Arc::new(MemoryNodeStore::new());
        let owner = Uuid::new_v4();
        let root = nodes
            .create(&CreateNode::folder("root", owner, None))
            .await
            .unwrap();
        let sub = nodes
            .create(&CreateNode::folder("sub", owner, Some(root.id)))
            .await
            .unwrap();
        let a = nodes
            .create(&CreateNode::file("a.bin", owner, root.id))
            .await
            .unwrap();
        let b = nodes
            .create(&CreateNode::file("b.bin", owner, sub.id))
            .await
            .unwrap();
        nodes.set_size(a.id, 100).await.unwrap();
        nodes.set_size(b.id, 250).await.unwrap();

        let sizes = SizeAggregator::new(nodes);
        assert_eq!(sizes.subtree_size(root.id).await.unwrap(), 350);
        assert_eq!(sizes.subtree_size(sub.id).await.unwrap(), 250);
    }

    #[tokio::test]
    async fn test_empty_folder_is_zero() {
        let nodes = Arc::new(MemoryNodeStore::new());
        let owner = Uuid::new_v4();
        let root = nodes
            .create(&CreateNode::folder("root", owner, None))
            .await
            .unwrap();

        let sizes = SizeAggregator::new(nodes);
        let usage = sizes.usage_of(&root).await.unwrap();
        assert_eq!(usage.raw_bytes, 0);
        assert_eq!(usage.formatted, "0 bytes");
    }
}
