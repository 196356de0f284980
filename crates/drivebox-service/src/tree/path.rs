//! Physical and public path resolution.
//!
//! A node has two paths. The physical path is built from immutable
//! storage identifiers and is the only path the blob backend sees. The
//! public path is built from display names and is computed on read, so
//! renames anywhere in the chain are reflected immediately.

use std::sync::Arc;

use uuid::Uuid;

use drivebox_core::{AppError, AppResult};
use drivebox_database::NodeStore;
use drivebox_entity::Node;

/// Resolves the ancestor chain of a node into paths.
#[derive(Clone)]
pub struct PathResolver {
    nodes: Arc<dyn NodeStore>,
    max_depth: u32,
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl PathResolver {
    pub fn new(nodes: Arc<dyn NodeStore>, max_depth: u32) -> Self {
        Self { nodes, max_depth }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// The validated chain from root to the node, root first.
    ///
    /// A chain that does not start at a root, or that exceeds the depth
    /// bound, indicates corrupted metadata.
    pub async fn ancestor_chain(&self, id: Uuid) -> AppResult<Vec<Node>> {
        let chain = self.nodes.ancestors(id).await?;
        match chain.first() {
            None => return Err(AppError::not_found("node not found")),
            Some(first) if !first.is_root() => {
                return Err(AppError::storage_inconsistency(
                    "node is detached from any root",
                ));
            }
            Some(_) => {}
        }
        if chain.len() as u32 > self.max_depth {
            return Err(AppError::storage_inconsistency(
                "ancestor chain exceeds maximum depth",
            ));
        }
        Ok(chain)
    }

    /// Physical path of the node at the end of `chain`.
    pub fn physical_path(&self, chain: &[Node]) -> String {
        chain
            .iter()
            .map(Node::storage_segment)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Public path of the node at the end of `chain`.
    pub fn public_path(&self, chain: &[Node]) -> String {
        chain
            .iter()
            .map(|n| n.name.clone())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Physical path of a node looked up by id.
    pub async fn physical_path_of(&self, id: Uuid) -> AppResult<String> {
        let chain = self.ancestor_chain(id).await?;
        Ok(self.physical_path(&chain))
    }

    /// Public path of a node looked up by id.
    pub async fn public_path_of(&self, id: Uuid) -> AppResult<String> {
        let chain = self.ancestor_chain(id).await?;
        Ok(self.public_path(&chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivebox_database::MemoryNodeStore;
    use drivebox_entity::CreateNode;

    #[tokio::test]
    async fn test_paths_diverge_between_storage_and_display() {
        let nodes = Arc::new(MemoryNodeStore::new());
        let owner = Uuid::new_v4();
        let root = nodes
            .create(&CreateNode::folder("alice", owner, None))
            .await
            .unwrap();
        let docs = nodes
            .create(&CreateNode::folder("Documents", owner, Some(root.id)))
            .await
            .unwrap();
        let file = nodes
            .create(&CreateNode::file("cv.pdf", owner, docs.id))
            .await
            .unwrap();

        let resolver = PathResolver::new(nodes, 32);
        let chain = resolver.ancestor_chain(file.id).await.unwrap();

        let public = resolver.public_path(&chain);
        assert_eq!(public, "alice/Documents/cv.pdf");

        let physical = resolver.physical_path(&chain);
        assert_eq!(
            physical,
            format!(
                "{}/{}/{}.pdf",
                root.storage_id, docs.storage_id, file.storage_id
            )
        );
    }

    #[tokio::test]
    async fn test_rename_changes_public_path_only() {
        let nodes = Arc::new(MemoryNodeStore::new());
        let owner = Uuid::new_v4();
        let root = nodes
            .create(&CreateNode::folder("root", owner, None))
            .await
            .unwrap();
        let folder = nodes
            .create(&CreateNode::folder("old", owner, Some(root.id)))
            .await
            .unwrap();

        let resolver = PathResolver::new(nodes.clone(), 32);
        let physical_before = resolver.physical_path_of(folder.id).await.unwrap();

        nodes.rename(folder.id, "new").await.unwrap();

        assert_eq!(
            resolver.physical_path_of(folder.id).await.unwrap(),
            physical_before
        );
        assert!(resolver
            .public_path_of(folder.id)
            .await
            .unwrap()
            .ends_with("/new"));
    }
}
