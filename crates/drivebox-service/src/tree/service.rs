//! Tree mutation and query service.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use drivebox_auth::AccessResolver;
use drivebox_core::config::TreeConfig;
use drivebox_core::error::ErrorKind;
use drivebox_core::traits::BlobStore;
use drivebox_core::types::{PageRequest, PageResponse};
use drivebox_core::{AppError, AppResult};
use drivebox_database::{GrantStore, NodeStore};
use drivebox_entity::{split_extension, CreateNode, Node, NodeAction};

use crate::context::Actor;

use super::{PathResolver, SizeAggregator, StorageUsage, SubtreeLocks};

/// Contents of a folder, split the way clients render them.
#[derive(Debug, Clone, Serialize)]
pub struct FolderListing {
    pub folder: Node,
    pub folders: Vec<Node>,
    pub files: Vec<Node>,
}

/// A node with its computed path and recursive size.
#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub node: Node,
    pub public_path: String,
    pub size: StorageUsage,
}

/// Folder and file tree operations.
///
/// Every mutation follows the same shape: resolve, authorize, change
/// metadata, change the physical backend, and roll the metadata back if
/// the physical step fails. Deletes invert the order and go physical
/// first, so a failure can never leave a reachable node without bytes.
pub struct TreeService {
    nodes: Arc<dyn NodeStore>,
    grants: Arc<dyn GrantStore>,
    blob: Arc<dyn BlobStore>,
    resolver: Arc<AccessResolver>,
    paths: PathResolver,
    sizes: SizeAggregator,
    locks: SubtreeLocks,
    max_depth: u32,
}

impl std::fmt::Debug for TreeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeService")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

/// Validate a display name for a folder or file.
pub(crate) fn validate_name(name: &str) -> AppResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("name cannot be empty"));
    }
    if trimmed.len() > 255 {
        return Err(AppError::validation("name is too long"));
    }
    if trimmed.contains('/') || trimmed.contains('\0') {
        return Err(AppError::validation("name contains forbidden characters"));
    }
    Ok(())
}

impl TreeService {
    pub fn new(
        nodes: Arc<dyn NodeStore>,
        grants: Arc<dyn GrantStore>,
        blob: Arc<dyn BlobStore>,
        resolver: Arc<AccessResolver>,
        config: &TreeConfig,
    ) -> Self {
        let paths = PathResolver::new(nodes.clone(), config.max_depth);
        let sizes = SizeAggregator::new(nodes.clone());
        Self {
            nodes,
            grants,
            blob,
            resolver,
            paths,
            sizes,
            locks: SubtreeLocks::new(),
            max_depth: config.max_depth,
        }
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    pub fn sizes(&self) -> &SizeAggregator {
        &self.sizes
    }

    /// Create the root folder for a user. Each user has exactly one.
    pub async fn create_root(&self, actor: &Actor, name: &str) -> AppResult<Node> {
        validate_name(name)?;
        if self.nodes.find_root(actor.user_id).await?.is_some() {
            return Err(AppError::conflict("user already has a root folder"));
        }

        let node = self
            .nodes
            .create(&CreateNode::folder(name.trim(), actor.user_id, None))
            .await?;

        if let Err(e) = self.blob.create_dir(&node.storage_id).await {
            self.nodes.delete_many(&[node.id]).await?;
            return Err(e);
        }

        tracing::info!(user_id = %actor.user_id, node_id = %node.id, "Root folder created");
        Ok(node)
    }

    /// Create a folder under `parent_id`, or under the actor's root when
    /// no parent is given.
    pub async fn create_folder(
        &self,
        actor: &Actor,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Node> {
        validate_name(name)?;
        let parent = self.resolve_folder(actor, parent_id).await?;
        self.resolver
            .require(
                actor.user_id,
                actor.role,
                actor.is_superadmin,
                &parent,
                NodeAction::Write,
            )
            .await?;

        let parent_chain = self.paths.ancestor_chain(parent.id).await?;
        if parent_chain.len() as u32 + 1 > self.max_depth {
            return Err(AppError::validation("maximum folder depth exceeded"));
        }

        let node = self
            .nodes
            .create(&CreateNode::folder(
                name.trim(),
                parent.owner_id,
                Some(parent.id),
            ))
            .await?;

        let physical = format!(
            "{}/{}",
            self.paths.physical_path(&parent_chain),
            node.storage_id
        );
        if let Err(e) = self.blob.create_dir(&physical).await {
            self.nodes.delete_many(&[node.id]).await?;
            return Err(e);
        }

        tracing::info!(
            user_id = %actor.user_id,
            node_id = %node.id,
            parent_id = %parent.id,
            "Folder created"
        );
        Ok(node)
    }

    /// Rename a node. Metadata only; the physical path never changes.
    ///
    /// Files keep their original extension regardless of what the new
    /// name carries.
    pub async fn rename(&self, actor: &Actor, node_id: Uuid, new_name: &str) -> AppResult<Node> {
        validate_name(new_name)?;
        let node = self.require_node(node_id).await?;
        if node.is_root() {
            return Err(AppError::validation("the root folder cannot be renamed"));
        }
        self.resolver
            .require(
                actor.user_id,
                actor.role,
                actor.is_superadmin,
                &node,
                NodeAction::Write,
            )
            .await?;

        let final_name = match (&node.extension, node.is_file()) {
            (Some(ext), true) => {
                let supplied = new_name.trim();
                let stem = match split_extension(supplied) {
                    Some(_) => supplied.rsplit_once('.').map(|(s, _)| s).unwrap_or(supplied),
                    None => supplied,
                };
                format!("{stem}.{ext}")
            }
            _ => new_name.trim().to_string(),
        };

        let renamed = self.nodes.rename(node.id, &final_name).await?;
        tracing::info!(user_id = %actor.user_id, node_id = %node.id, name = %final_name, "Node renamed");
        Ok(renamed)
    }

    /// Move a node under a new parent folder within the same owner tree.
    ///
    /// All validation runs under the owner's subtree lock so a concurrent
    /// move cannot invalidate the cycle guard between check and commit.
    pub async fn move_node(
        &self,
        actor: &Actor,
        node_id: Uuid,
        new_parent_id: Uuid,
    ) -> AppResult<Node> {
        let node = self.require_node(node_id).await?;
        if node.is_root() {
            return Err(AppError::validation("the root folder cannot be moved"));
        }
        let chain = self.paths.ancestor_chain(node.id).await?;
        let _guard = self.locks.lock(chain[0].id).await;

        // Re-read under the lock; the tree may have changed while waiting.
        let node = self.require_node(node_id).await?;
        let new_parent = self.require_node(new_parent_id).await?;
        if !new_parent.is_folder() {
            return Err(AppError::validation("destination is not a folder"));
        }
        if new_parent.owner_id != node.owner_id {
            return Err(AppError::validation(
                "cannot move a node into another user's tree",
            ));
        }
        if new_parent.id == node.id {
            return Err(AppError::validation("cannot move a folder into itself"));
        }

        self.resolver
            .require(
                actor.user_id,
                actor.role,
                actor.is_superadmin,
                &node,
                NodeAction::Write,
            )
            .await?;
        self.resolver
            .require(
                actor.user_id,
                actor.role,
                actor.is_superadmin,
                &new_parent,
                NodeAction::Write,
            )
            .await?;

        let dest_chain = self.paths.ancestor_chain(new_parent.id).await?;
        if dest_chain.iter().any(|n| n.id == node.id) {
            return Err(AppError::validation(
                "cannot move a folder into its own subtree",
            ));
        }
        // The deepest descendant of the moved subtree must stay in bounds.
        let height = self.subtree_height(&node).await?;
        if dest_chain.len() as u32 + height > self.max_depth {
            return Err(AppError::validation("maximum folder depth exceeded"));
        }

        let old_physical = self.paths.physical_path_of(node.id).await?;
        let old_parent = node
            .parent_id
            .ok_or_else(|| AppError::storage_inconsistency("non-root node has no parent"))?;

        let moved = self.nodes.set_parent(node.id, new_parent.id).await?;
        let new_physical = format!(
            "{}/{}",
            self.paths.physical_path(&dest_chain),
            moved.storage_segment()
        );

        if let Err(e) = self.blob.rename(&old_physical, &new_physical).await {
            // Physical move failed; put the metadata back where it was.
            if let Err(rollback_err) = self.nodes.set_parent(node.id, old_parent).await {
                tracing::error!(
                    node_id = %node.id,
                    error = %rollback_err,
                    "Metadata rollback failed after failed physical move"
                );
                return Err(AppError::with_source(
                    ErrorKind::StorageInconsistency,
                    "metadata rollback failed after failed physical move",
                    rollback_err,
                ));
            }
            return Err(e);
        }

        tracing::info!(
            user_id = %actor.user_id,
            node_id = %node.id,
            new_parent_id = %new_parent.id,
            "Node moved"
        );
        Ok(moved)
    }

    /// Delete a single node and everything underneath it.
    pub async fn delete(&self, actor: &Actor, node_id: Uuid) -> AppResult<u64> {
        self.delete_many(actor, &[node_id]).await
    }

    /// Delete several nodes with their subtrees.
    ///
    /// Authorization is checked for every target before anything is
    /// touched. Physical deletion runs before metadata removal; a
    /// metadata failure after the bytes are gone is surfaced as a
    /// storage inconsistency.
    pub async fn delete_many(&self, actor: &Actor, node_ids: &[Uuid]) -> AppResult<u64> {
        let mut targets = Vec::with_capacity(node_ids.len());
        let mut root_keys = Vec::new();
        for &id in node_ids {
            let node = self.require_node(id).await?;
            if node.is_root() {
                return Err(AppError::validation("the root folder cannot be deleted"));
            }
            self.resolver
                .require(
                    actor.user_id,
                    actor.role,
                    actor.is_superadmin,
                    &node,
                    NodeAction::Delete,
                )
                .await?;
            let chain = self.paths.ancestor_chain(node.id).await?;
            root_keys.push(chain[0].id);
            targets.push(node);
        }

        let _guards = self.locks.lock_all(&root_keys).await;

        let mut removed = 0;
        for node in targets {
            // An earlier target in the batch may have covered this one.
            let Some(node) = self.nodes.find(node.id).await? else {
                continue;
            };

            let physical = self.paths.physical_path_of(node.id).await?;
            if node.is_folder() {
                self.blob.delete_dir(&physical).await?;
            } else {
                self.blob.delete(&physical).await?;
            }

            let mut subtree: Vec<Uuid> =
                self.nodes.descendants(node.id).await?.iter().map(|n| n.id).collect();
            subtree.push(node.id);

            if let Err(e) = self.grants.delete_for_nodes(&subtree).await {
                tracing::error!(node_id = %node.id, error = %e, "Grant cleanup failed after physical delete");
                return Err(AppError::with_source(
                    ErrorKind::StorageInconsistency,
                    "metadata cleanup failed after physical delete",
                    e,
                ));
            }
            match self.nodes.delete_many(&subtree).await {
                Ok(count) => removed += count,
                Err(e) => {
                    tracing::error!(node_id = %node.id, error = %e, "Metadata delete failed after physical delete");
                    return Err(AppError::with_source(
                        ErrorKind::StorageInconsistency,
                        "metadata delete failed after physical delete",
                        e,
                    ));
                }
            }

            tracing::info!(user_id = %actor.user_id, node_id = %node.id, "Node deleted");
        }
        Ok(removed)
    }

    /// List a folder's children, folders and files separated.
    pub async fn listing(
        &self,
        actor: &Actor,
        folder_id: Option<Uuid>,
    ) -> AppResult<FolderListing> {
        let folder = self.resolve_folder(actor, folder_id).await?;
        self.resolver
            .require(
                actor.user_id,
                actor.role,
                actor.is_superadmin,
                &folder,
                NodeAction::Read,
            )
            .await?;

        let children = self.nodes.children(folder.id).await?;
        let (folders, files) = children.into_iter().partition(Node::is_folder);
        Ok(FolderListing {
            folder,
            folders,
            files,
        })
    }

    /// One page of a folder's children.
    pub async fn children_page(
        &self,
        actor: &Actor,
        folder_id: Option<Uuid>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Node>> {
        let folder = self.resolve_folder(actor, folder_id).await?;
        self.resolver
            .require(
                actor.user_id,
                actor.role,
                actor.is_superadmin,
                &folder,
                NodeAction::Read,
            )
            .await?;
        self.nodes.children_page(folder.id, page).await
    }

    /// A node with its public path and recursive size.
    pub async fn node_info(&self, actor: &Actor, node_id: Uuid) -> AppResult<NodeInfo> {
        let node = self.require_node(node_id).await?;
        self.resolver
            .require(
                actor.user_id,
                actor.role,
                actor.is_superadmin,
                &node,
                NodeAction::Read,
            )
            .await?;

        let public_path = self.paths.public_path_of(node.id).await?;
        let size = self.sizes.usage_of(&node).await?;
        Ok(NodeInfo {
            node,
            public_path,
            size,
        })
    }

    /// Total usage of the actor's own tree.
    pub async fn storage_usage(&self, actor: &Actor) -> AppResult<StorageUsage> {
        let root = self
            .nodes
            .find_root(actor.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user has no root folder"))?;
        self.sizes.usage_of(&root).await
    }

    /// Number of levels occupied by a node and its subtree.
    ///
    /// Relies on `descendants` listing parents before their children.
    async fn subtree_height(&self, node: &Node) -> AppResult<u32> {
        let descendants = self.nodes.descendants(node.id).await?;
        let mut depth: HashMap<Uuid, u32> = HashMap::new();
        depth.insert(node.id, 1);
        let mut height = 1;
        for child in &descendants {
            let parent_depth = child
                .parent_id
                .and_then(|p| depth.get(&p).copied())
                .unwrap_or(1);
            depth.insert(child.id, parent_depth + 1);
            height = height.max(parent_depth + 1);
        }
        Ok(height)
    }

    async fn require_node(&self, id: Uuid) -> AppResult<Node> {
        self.nodes
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found("node not found"))
    }

    /// Resolve an optional folder id, defaulting to the actor's root.
    async fn resolve_folder(&self, actor: &Actor, folder_id: Option<Uuid>) -> AppResult<Node> {
        let folder = match folder_id {
            Some(id) => self.require_node(id).await?,
            None => self
                .nodes
                .find_root(actor.user_id)
                .await?
                .ok_or_else(|| AppError::not_found("user has no root folder"))?,
        };
        if !folder.is_folder() {
            return Err(AppError::validation("node is not a folder"));
        }
        Ok(folder)
    }
}
