//! In-memory grant store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use drivebox_core::{AppError, AppResult};
use drivebox_entity::{NodeAction, PermissionGrant};

use crate::store::GrantStore;

/// Grant store backed by a process-local map keyed by (user, node).
#[derive(Debug, Default)]
pub struct MemoryGrantStore {
    grants: RwLock<HashMap<(Uuid, Uuid), PermissionGrant>>,
}

impl MemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GrantStore for MemoryGrantStore {
    async fn find(&self, user_id: Uuid, node_id: Uuid) -> AppResult<Option<PermissionGrant>> {
        Ok(self.grants.read().await.get(&(user_id, node_id)).cloned())
    }

    async fn find_for_node(&self, node_id: Uuid) -> AppResult<Vec<PermissionGrant>> {
        let grants = self.grants.read().await;
        let mut result: Vec<PermissionGrant> = grants
            .values()
            .filter(|g| g.node_id == node_id)
            .cloned()
            .collect();
        result.sort_by_key(|g| g.created_at);
        Ok(result)
    }

    async fn create(
        &self,
        user_id: Uuid,
        node_id: Uuid,
        actions: &[NodeAction],
    ) -> AppResult<PermissionGrant> {
        let mut grants = self.grants.write().await;
        if grants.contains_key(&(user_id, node_id)) {
            return Err(AppError::conflict(
                "a grant already exists for this user and node",
            ));
        }
        let now = Utc::now();
        let grant = PermissionGrant {
            id: Uuid::new_v4(),
            user_id,
            node_id,
            actions: actions.to_vec(),
            created_at: now,
            updated_at: now,
        };
        grants.insert((user_id, node_id), grant.clone());
        Ok(grant)
    }

    async fn replace(
        &self,
        user_id: Uuid,
        node_id: Uuid,
        actions: &[NodeAction],
    ) -> AppResult<PermissionGrant> {
        let mut grants = self.grants.write().await;
        let grant = grants
            .get_mut(&(user_id, node_id))
            .ok_or_else(|| AppError::not_found("grant not found"))?;
        grant.actions = actions.to_vec();
        grant.updated_at = Utc::now();
        Ok(grant.clone())
    }

    async fn delete(&self, user_id: Uuid, node_id: Uuid) -> AppResult<bool> {
        Ok(self
            .grants
            .write()
            .await
            .remove(&(user_id, node_id))
            .is_some())
    }

    async fn delete_for_nodes(&self, node_ids: &[Uuid]) -> AppResult<u64> {
        let mut grants = self.grants.write().await;
        let before = grants.len();
        grants.retain(|_, g| !node_ids.contains(&g.node_id));
        Ok((before - grants.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_grant_rejected() {
        let store = MemoryGrantStore::new();
        let (user, node) = (Uuid::new_v4(), Uuid::new_v4());
        store.create(user, node, &[NodeAction::Read]).await.unwrap();
        let err = store
            .create(user, node, &[NodeAction::Write])
            .await
            .unwrap_err();
        assert_eq!(err.kind, drivebox_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_replace_swaps_action_set() {
        let store = MemoryGrantStore::new();
        let (user, node) = (Uuid::new_v4(), Uuid::new_v4());
        store.create(user, node, &[NodeAction::Read]).await.unwrap();
        let updated = store
            .replace(user, node, &[NodeAction::Read, NodeAction::Delete])
            .await
            .unwrap();
        assert_eq!(updated.actions, vec![NodeAction::Read, NodeAction::Delete]);
    }

    #[tokio::test]
    async fn test_delete_for_nodes_sweeps_grants() {
        let store = MemoryGrantStore::new();
        let node = Uuid::new_v4();
        store
            .create(Uuid::new_v4(), node, &[NodeAction::Read])
            .await
            .unwrap();
        store
            .create(Uuid::new_v4(), node, &[NodeAction::Read])
            .await
            .unwrap();
        assert_eq!(store.delete_for_nodes(&[node]).await.unwrap(), 2);
        assert!(store.find_for_node(node).await.unwrap().is_empty());
    }
}
