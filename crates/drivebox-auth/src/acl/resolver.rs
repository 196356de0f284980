//! Layered access resolution.
//!
//! The layers are checked in order and the first match wins:
//!
//! 1. The owner of a node may do anything to it.
//! 2. A superadmin admin may do anything to any node.
//! 3. A plain admin is denied outright; admin rank alone grants nothing
//!    inside member trees.
//! 4. A direct grant on the node allowing the action.
//! 5. For files only, an inherited grant from the folder chain. In
//!    `ParentOnly` mode just the containing folder is consulted; in
//!    `FullChain` mode the walk continues to the root. Folders never
//!    inherit.
//! 6. Otherwise denied.

use std::sync::Arc;

use uuid::Uuid;

use drivebox_core::config::InheritanceMode;
use drivebox_core::{AppError, AppResult};
use drivebox_database::{GrantStore, NodeStore};
use drivebox_entity::{Node, NodeAction, UserRole};

/// Where an access decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSource {
    Owner,
    SuperadminBypass,
    DirectGrant,
    InheritedGrant,
    Denied,
}

/// The outcome of resolving one (actor, node, action) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub granted: bool,
    pub source: AccessSource,
}

impl AccessDecision {
    fn allow(source: AccessSource) -> Self {
        Self {
            granted: true,
            source,
        }
    }

    fn deny() -> Self {
        Self {
            granted: false,
            source: AccessSource::Denied,
        }
    }
}

/// Resolves access decisions against the node and grant stores.
pub struct AccessResolver {
    nodes: Arc<dyn NodeStore>,
    grants: Arc<dyn GrantStore>,
    inheritance: InheritanceMode,
}

impl std::fmt::Debug for AccessResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessResolver")
            .field("inheritance", &self.inheritance)
            .finish_non_exhaustive()
    }
}

impl AccessResolver {
    pub fn new(
        nodes: Arc<dyn NodeStore>,
        grants: Arc<dyn GrantStore>,
        inheritance: InheritanceMode,
    ) -> Self {
        Self {
            nodes,
            grants,
            inheritance,
        }
    }

    /// Resolve whether `user_id` may perform `action` on `node`.
    pub async fn authorize(
        &self,
        user_id: Uuid,
        role: UserRole,
        is_superadmin: bool,
        node: &Node,
        action: NodeAction,
    ) -> AppResult<AccessDecision> {
        if node.owner_id == user_id {
            return Ok(AccessDecision::allow(AccessSource::Owner));
        }

        if role == UserRole::Admin {
            if is_superadmin {
                return Ok(AccessDecision::allow(AccessSource::SuperadminBypass));
            }
            return Ok(AccessDecision::deny());
        }

        if let Some(grant) = self.grants.find(user_id, node.id).await? {
            if grant.allows(action) {
                return Ok(AccessDecision::allow(AccessSource::DirectGrant));
            }
        }

        if node.is_file() {
            return self.resolve_inherited(user_id, node, action).await;
        }

        Ok(AccessDecision::deny())
    }

    /// Resolve like [`authorize`](Self::authorize) but turn a denial into
    /// an authorization error.
    pub async fn require(
        &self,
        user_id: Uuid,
        role: UserRole,
        is_superadmin: bool,
        node: &Node,
        action: NodeAction,
    ) -> AppResult<AccessDecision> {
        let decision = self
            .authorize(user_id, role, is_superadmin, node, action)
            .await?;
        if decision.granted {
            Ok(decision)
        } else {
            tracing::debug!(
                user_id = %user_id,
                node_id = %node.id,
                action = %action,
                "Access denied"
            );
            Err(AppError::authorization(format!(
                "not allowed to {action} this {}",
                node.kind
            )))
        }
    }

    async fn resolve_inherited(
        &self,
        user_id: Uuid,
        node: &Node,
        action: NodeAction,
    ) -> AppResult<AccessDecision> {
        let Some(parent_id) = node.parent_id else {
            return Ok(AccessDecision::deny());
        };

        match self.inheritance {
            InheritanceMode::ParentOnly => {
                if let Some(grant) = self.grants.find(user_id, parent_id).await? {
                    if grant.allows(action) {
                        return Ok(AccessDecision::allow(AccessSource::InheritedGrant));
                    }
                }
                Ok(AccessDecision::deny())
            }
            InheritanceMode::FullChain => {
                let chain = self.nodes.ancestors(parent_id).await?;
                // Nearest folder first.
                for folder in chain.iter().rev() {
                    if let Some(grant) = self.grants.find(user_id, folder.id).await? {
                        if grant.allows(action) {
                            return Ok(AccessDecision::allow(AccessSource::InheritedGrant));
                        }
                    }
                }
                Ok(AccessDecision::deny())
            }
        }
    }
}
