//! In-memory node store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use drivebox_core::types::{PageRequest, PageResponse};
use drivebox_core::{AppError, AppResult};
use drivebox_entity::{CreateNode, Node, NodeKind};

use crate::store::NodeStore;

const MAX_WALK: usize = 64;

/// Node store backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    nodes: RwLock<HashMap<Uuid, Node>>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Folders sort before files, then by name.
fn listing_order(a: &Node, b: &Node) -> std::cmp::Ordering {
    let rank = |n: &Node| n.kind == NodeKind::File;
    rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn create(&self, input: &CreateNode) -> AppResult<Node> {
        let mut nodes = self.nodes.write().await;

        if nodes.values().any(|n| n.storage_id == input.storage_id) {
            return Err(AppError::conflict("storage identifier collision"));
        }
        match input.parent_id {
            None => {
                if nodes
                    .values()
                    .any(|n| n.owner_id == input.owner_id && n.parent_id.is_none())
                {
                    return Err(AppError::conflict("user already has a root folder"));
                }
            }
            Some(parent_id) => {
                if !nodes.contains_key(&parent_id) {
                    return Err(AppError::conflict("parent folder does not exist"));
                }
                if nodes
                    .values()
                    .any(|n| n.parent_id == Some(parent_id) && n.name == input.name)
                {
                    return Err(AppError::conflict("a sibling with this name already exists"));
                }
            }
        }

        let now = Utc::now();
        let node = Node {
            id: Uuid::new_v4(),
            storage_id: input.storage_id.clone(),
            name: input.name.clone(),
            kind: input.kind,
            owner_id: input.owner_id,
            parent_id: input.parent_id,
            size_bytes: input.size_bytes,
            extension: input.extension.clone(),
            created_at: now,
            updated_at: now,
        };
        nodes.insert(node.id, node.clone());
        Ok(node)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Node>> {
        Ok(self.nodes.read().await.get(&id).cloned())
    }

    async fn find_root(&self, owner_id: Uuid) -> AppResult<Option<Node>> {
        Ok(self
            .nodes
            .read()
            .await
            .values()
            .find(|n| n.owner_id == owner_id && n.parent_id.is_none())
            .cloned())
    }

    async fn children(&self, parent_id: Uuid) -> AppResult<Vec<Node>> {
        let nodes = self.nodes.read().await;
        let mut children: Vec<Node> = nodes
            .values()
            .filter(|n| n.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by(listing_order);
        Ok(children)
    }

    async fn children_page(
        &self,
        parent_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Node>> {
        let all = self.children(parent_id).await?;
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Node>> {
        let nodes = self.nodes.read().await;
        let mut chain = Vec::new();
        let mut current = nodes.get(&id).cloned();
        while let Some(node) = current {
            if chain.len() >= MAX_WALK {
                return Err(AppError::storage_inconsistency(
                    "ancestor chain exceeds depth bound",
                ));
            }
            current = node.parent_id.and_then(|p| nodes.get(&p).cloned());
            chain.push(node);
        }
        chain.reverse();
        Ok(chain)
    }

    async fn descendants(&self, id: Uuid) -> AppResult<Vec<Node>> {
        let nodes = self.nodes.read().await;
        let mut result = Vec::new();
        let mut frontier = vec![id];
        let mut depth = 0;
        while !frontier.is_empty() {
            if depth >= MAX_WALK {
                return Err(AppError::storage_inconsistency(
                    "descendant walk exceeds depth bound",
                ));
            }
            let mut level: Vec<Node> = nodes
                .values()
                .filter(|n| n.parent_id.map(|p| frontier.contains(&p)).unwrap_or(false))
                .cloned()
                .collect();
            level.sort_by(|a, b| a.name.cmp(&b.name));
            frontier = level.iter().map(|n| n.id).collect();
            result.extend(level);
            depth += 1;
        }
        Ok(result)
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Node> {
        let mut nodes = self.nodes.write().await;
        let parent_id = nodes
            .get(&id)
            .ok_or_else(|| AppError::not_found("node not found"))?
            .parent_id;
        if nodes
            .values()
            .any(|n| n.id != id && n.parent_id == parent_id && parent_id.is_some() && n.name == name)
        {
            return Err(AppError::conflict("a sibling with this name already exists"));
        }
        let node = nodes.get_mut(&id).expect("checked above");
        node.name = name.to_string();
        node.updated_at = Utc::now();
        Ok(node.clone())
    }

    async fn set_parent(&self, id: Uuid, parent_id: Uuid) -> AppResult<Node> {
        let mut nodes = self.nodes.write().await;
        if !nodes.contains_key(&parent_id) {
            return Err(AppError::conflict("parent folder does not exist"));
        }
        let name = nodes
            .get(&id)
            .ok_or_else(|| AppError::not_found("node not found"))?
            .name
            .clone();
        if nodes
            .values()
            .any(|n| n.id != id && n.parent_id == Some(parent_id) && n.name == name)
        {
            return Err(AppError::conflict("a sibling with this name already exists"));
        }
        let node = nodes.get_mut(&id).expect("checked above");
        node.parent_id = Some(parent_id);
        node.updated_at = Utc::now();
        Ok(node.clone())
    }

    async fn set_size(&self, id: Uuid, size_bytes: i64) -> AppResult<Node> {
        let mut nodes = self.nodes.write().await;
        let node = nodes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("node not found"))?;
        node.size_bytes = Some(size_bytes);
        node.updated_at = Utc::now();
        Ok(node.clone())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        let mut nodes = self.nodes.write().await;
        let mut removed = 0;
        for id in ids {
            if nodes.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(name: &str, owner: Uuid, parent: Option<Uuid>) -> CreateNode {
        CreateNode::folder(name, owner, parent)
    }

    #[tokio::test]
    async fn test_second_root_rejected() {
        let store = MemoryNodeStore::new();
        let owner = Uuid::new_v4();
        store.create(&folder("root", owner, None)).await.unwrap();
        let err = store.create(&folder("other", owner, None)).await.unwrap_err();
        assert_eq!(err.kind, drivebox_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_sibling_name_collision_rejected() {
        let store = MemoryNodeStore::new();
        let owner = Uuid::new_v4();
        let root = store.create(&folder("root", owner, None)).await.unwrap();
        store
            .create(&folder("docs", owner, Some(root.id)))
            .await
            .unwrap();
        let err = store
            .create(&folder("docs", owner, Some(root.id)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, drivebox_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_duplicate_storage_id_rejected() {
        let store = MemoryNodeStore::new();
        let owner = Uuid::new_v4();
        let root = store.create(&folder("root", owner, None)).await.unwrap();

        let mut input = folder("docs", owner, Some(root.id));
        input.storage_id = root.storage_id.clone();
        let err = store.create(&input).await.unwrap_err();
        assert_eq!(err.kind, drivebox_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_delete_is_not_repeatable() {
        let store = MemoryNodeStore::new();
        let owner = Uuid::new_v4();
        let root = store.create(&folder("root", owner, None)).await.unwrap();
        let docs = store
            .create(&folder("docs", owner, Some(root.id)))
            .await
            .unwrap();

        assert_eq!(store.delete_many(&[docs.id]).await.unwrap(), 1);
        assert_eq!(store.delete_many(&[docs.id]).await.unwrap(), 0);
        assert!(store.find(docs.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ancestors_root_first() {
        let store = MemoryNodeStore::new();
        let owner = Uuid::new_v4();
        let root = store.create(&folder("root", owner, None)).await.unwrap();
        let a = store
            .create(&folder("a", owner, Some(root.id)))
            .await
            .unwrap();
        let b = store.create(&folder("b", owner, Some(a.id))).await.unwrap();

        let chain = store.ancestors(b.id).await.unwrap();
        let ids: Vec<Uuid> = chain.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![root.id, a.id, b.id]);
    }

    #[tokio::test]
    async fn test_descendants_excludes_self() {
        let store = MemoryNodeStore::new();
        let owner = Uuid::new_v4();
        let root = store.create(&folder("root", owner, None)).await.unwrap();
        let a = store
            .create(&folder("a", owner, Some(root.id)))
            .await
            .unwrap();
        let b = store.create(&folder("b", owner, Some(a.id))).await.unwrap();

        let sub = store.descendants(root.id).await.unwrap();
        let ids: Vec<Uuid> = sub.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_children_folders_before_files() {
        let store = MemoryNodeStore::new();
        let owner = Uuid::new_v4();
        let root = store.create(&folder("root", owner, None)).await.unwrap();
        store
            .create(&CreateNode::file("zeta.txt", owner, root.id))
            .await
            .unwrap();
        store
            .create(&folder("alpha", owner, Some(root.id)))
            .await
            .unwrap();

        let children = store.children(root.id).await.unwrap();
        assert_eq!(children[0].name, "alpha");
        assert_eq!(children[1].name, "zeta.txt");
    }
}
