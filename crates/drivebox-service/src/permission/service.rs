//! Grant management.
//!
//! Only the owner of a node manages its grants; admin rank gives no say
//! here. Grants are per (user, node) and updates replace the whole
//! action set.

use std::sync::Arc;

use uuid::Uuid;

use drivebox_core::{AppError, AppResult};
use drivebox_database::{GrantStore, NodeStore};
use drivebox_entity::{Node, NodeAction, PermissionGrant};

use crate::context::Actor;

pub struct PermissionService {
    nodes: Arc<dyn NodeStore>,
    grants: Arc<dyn GrantStore>,
}

impl std::fmt::Debug for PermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionService").finish_non_exhaustive()
    }
}

impl PermissionService {
    pub fn new(nodes: Arc<dyn NodeStore>, grants: Arc<dyn GrantStore>) -> Self {
        Self { nodes, grants }
    }

    /// All grants on a node.
    pub async fn grants_for_node(
        &self,
        actor: &Actor,
        node_id: Uuid,
    ) -> AppResult<Vec<PermissionGrant>> {
        self.require_owned(actor, node_id).await?;
        self.grants.find_for_node(node_id).await
    }

    /// The grant of one user on one node.
    pub async fn get_grant(
        &self,
        actor: &Actor,
        node_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<PermissionGrant> {
        self.require_owned(actor, node_id).await?;
        self.grants
            .find(user_id, node_id)
            .await?
            .ok_or_else(|| AppError::not_found("grant not found"))
    }

    /// Grant actions on a node to another user.
    pub async fn grant(
        &self,
        actor: &Actor,
        node_id: Uuid,
        user_id: Uuid,
        actions: &[NodeAction],
    ) -> AppResult<PermissionGrant> {
        let node = self.require_owned(actor, node_id).await?;
        if user_id == node.owner_id {
            return Err(AppError::validation(
                "the owner does not need a grant on their own node",
            ));
        }
        if actions.is_empty() {
            return Err(AppError::validation("a grant needs at least one action"));
        }

        let grant = self.grants.create(user_id, node_id, actions).await?;
        tracing::info!(
            owner_id = %actor.user_id,
            grantee_id = %user_id,
            node_id = %node_id,
            "Grant created"
        );
        Ok(grant)
    }

    /// Replace the action set of an existing grant.
    pub async fn replace(
        &self,
        actor: &Actor,
        node_id: Uuid,
        user_id: Uuid,
        actions: &[NodeAction],
    ) -> AppResult<PermissionGrant> {
        self.require_owned(actor, node_id).await?;
        if actions.is_empty() {
            return Err(AppError::validation("a grant needs at least one action"));
        }

        let grant = self.grants.replace(user_id, node_id, actions).await?;
        tracing::info!(
            owner_id = %actor.user_id,
            grantee_id = %user_id,
            node_id = %node_id,
            "Grant updated"
        );
        Ok(grant)
    }

    /// Remove a user's grant from a node.
    pub async fn revoke(&self, actor: &Actor, node_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.require_owned(actor, node_id).await?;
        if !self.grants.delete(user_id, node_id).await? {
            return Err(AppError::not_found("grant not found"));
        }
        tracing::info!(
            owner_id = %actor.user_id,
            grantee_id = %user_id,
            node_id = %node_id,
            "Grant revoked"
        );
        Ok(())
    }

    async fn require_owned(&self, actor: &Actor, node_id: Uuid) -> AppResult<Node> {
        let node = self
            .nodes
            .find(node_id)
            .await?
            .ok_or_else(|| AppError::not_found("node not found"))?;
        if node.owner_id != actor.user_id {
            return Err(AppError::authorization(
                "only the owner manages grants on a node",
            ));
        }
        Ok(node)
    }
}
