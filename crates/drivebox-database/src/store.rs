//! Storage traits for tree nodes and permission grants.
//!
//! Services depend on these traits rather than on a concrete backend, so
//! the same service code runs against PostgreSQL in production and the
//! in-memory stores in tests.

use async_trait::async_trait;
use uuid::Uuid;

use drivebox_core::types::{PageRequest, PageResponse};
use drivebox_core::AppResult;
use drivebox_entity::{CreateNode, Node, NodeAction, PermissionGrant};

/// Metadata store for tree nodes.
#[async_trait]
pub trait NodeStore: Send + Sync + 'static {
    /// Insert a new node. Fails with `Conflict` on a sibling name clash,
    /// a duplicate storage identifier, or a second root for the owner.
    async fn create(&self, input: &CreateNode) -> AppResult<Node>;

    /// Look up a node by id.
    async fn find(&self, id: Uuid) -> AppResult<Option<Node>>;

    /// Look up the root folder of an owner.
    async fn find_root(&self, owner_id: Uuid) -> AppResult<Option<Node>>;

    /// All direct children of a folder, folders before files, names sorted.
    async fn children(&self, parent_id: Uuid) -> AppResult<Vec<Node>>;

    /// One page of direct children of a folder.
    async fn children_page(
        &self,
        parent_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Node>>;

    /// The chain from the root down to the node itself, root first,
    /// node included.
    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Node>>;

    /// Every node underneath the given node, the node itself excluded.
    /// Parents always precede their children in the result.
    async fn descendants(&self, id: Uuid) -> AppResult<Vec<Node>>;

    /// Change the display name of a node.
    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Node>;

    /// Reattach a node under a new parent.
    async fn set_parent(&self, id: Uuid, parent_id: Uuid) -> AppResult<Node>;

    /// Record the byte size of a file after its blob is committed.
    async fn set_size(&self, id: Uuid, size_bytes: i64) -> AppResult<Node>;

    /// Delete the given nodes. Returns the number of rows removed.
    async fn delete_many(&self, ids: &[Uuid]) -> AppResult<u64>;
}

/// Store for permission grants.
#[async_trait]
pub trait GrantStore: Send + Sync + 'static {
    /// Look up the grant of one user on one node.
    async fn find(&self, user_id: Uuid, node_id: Uuid) -> AppResult<Option<PermissionGrant>>;

    /// All grants attached to a node.
    async fn find_for_node(&self, node_id: Uuid) -> AppResult<Vec<PermissionGrant>>;

    /// Create a grant. Fails with `Conflict` if one already exists for the
    /// (user, node) pair.
    async fn create(
        &self,
        user_id: Uuid,
        node_id: Uuid,
        actions: &[NodeAction],
    ) -> AppResult<PermissionGrant>;

    /// Replace the action set of an existing grant.
    async fn replace(
        &self,
        user_id: Uuid,
        node_id: Uuid,
        actions: &[NodeAction],
    ) -> AppResult<PermissionGrant>;

    /// Remove a grant. Returns whether one existed.
    async fn delete(&self, user_id: Uuid, node_id: Uuid) -> AppResult<bool>;

    /// Remove every grant attached to any of the given nodes.
    async fn delete_for_nodes(&self, node_ids: &[Uuid]) -> AppResult<u64>;
}
