//! Staged, scanned upload pipeline.
//!
//! Upload flow: validate, authorize, check quota, stage the bytes, scan
//! the staged file, then commit (metadata row, blob write, size read back
//! from storage). The staged file is removed on every path, accepted or
//! not. Nothing is visible in the tree until the commit completes.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use uuid::Uuid;

use drivebox_auth::AccessResolver;
use drivebox_core::config::{ScanConfig, StorageConfig};
use drivebox_core::traits::{BlobStore, MalwareScanner};
use drivebox_core::{AppError, AppResult};
use drivebox_database::NodeStore;
use drivebox_entity::{CreateNode, Node, NodeAction};
use drivebox_storage::StagingArea;

use crate::context::Actor;
use crate::tree::{validate_name, PathResolver, SizeAggregator};

/// One upload to commit into a folder.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Destination folder; the actor's root when `None`.
    pub folder_id: Option<Uuid>,
    pub file_name: String,
    pub data: Bytes,
}

pub struct UploadService {
    nodes: Arc<dyn NodeStore>,
    resolver: Arc<AccessResolver>,
    blob: Arc<dyn BlobStore>,
    staging: StagingArea,
    scanner: Arc<dyn MalwareScanner>,
    paths: PathResolver,
    sizes: SizeAggregator,
    storage: StorageConfig,
    scan: ScanConfig,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("staging", &self.staging)
            .field("scan", &self.scan)
            .finish_non_exhaustive()
    }
}

impl UploadService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nodes: Arc<dyn NodeStore>,
        resolver: Arc<AccessResolver>,
        blob: Arc<dyn BlobStore>,
        staging: StagingArea,
        scanner: Arc<dyn MalwareScanner>,
        max_depth: u32,
        storage: StorageConfig,
        scan: ScanConfig,
    ) -> Self {
        let paths = PathResolver::new(nodes.clone(), max_depth);
        let sizes = SizeAggregator::new(nodes.clone());
        Self {
            nodes,
            resolver,
            blob,
            staging,
            scanner,
            paths,
            sizes,
            storage,
            scan,
        }
    }

    /// Run the full pipeline for one upload and return the committed file.
    pub async fn upload(&self, actor: &Actor, request: UploadRequest) -> AppResult<Node> {
        validate_name(&request.file_name)?;
        if request.data.len() as u64 > self.storage.max_upload_size_bytes {
            return Err(AppError::validation("upload exceeds the maximum file size"));
        }

        let dest = match request.folder_id {
            Some(id) => self
                .nodes
                .find(id)
                .await?
                .ok_or_else(|| AppError::not_found("destination folder not found"))?,
            None => self
                .nodes
                .find_root(actor.user_id)
                .await?
                .ok_or_else(|| AppError::not_found("user has no root folder"))?,
        };
        if !dest.is_folder() {
            return Err(AppError::validation("destination is not a folder"));
        }

        self.resolver
            .require(
                actor.user_id,
                actor.role,
                actor.is_superadmin,
                &dest,
                NodeAction::Write,
            )
            .await?;

        self.check_quota(&dest, request.data.len() as u64).await?;

        let file_name = request.file_name.trim();
        if self
            .nodes
            .children(dest.id)
            .await?
            .iter()
            .any(|n| n.name == file_name)
        {
            return Err(AppError::conflict("a sibling with this name already exists"));
        }

        let staged = self.staging.stage(file_name, &request.data).await?;
        let result = self
            .scan_and_commit(actor, &dest, file_name, &request.data, &staged)
            .await;
        self.staging.discard(&staged).await;
        result
    }

    async fn scan_and_commit(
        &self,
        actor: &Actor,
        dest: &Node,
        file_name: &str,
        data: &Bytes,
        staged: &Path,
    ) -> AppResult<Node> {
        if self.scan.enabled {
            let timeout = Duration::from_secs(self.scan.timeout_seconds);
            let report = tokio::time::timeout(timeout, self.scanner.scan(staged))
                .await
                .map_err(|_| AppError::backend_unavailable("malware scan timed out"))??;
            if report.is_malicious() {
                tracing::warn!(
                    user_id = %actor.user_id,
                    file_name = %file_name,
                    detections = report.detected,
                    "Upload rejected by malware scan"
                );
                return Err(AppError::validation("upload rejected by malware scan"));
            }
        }

        let node = self
            .nodes
            .create(&CreateNode::file(file_name, dest.owner_id, dest.id))
            .await?;

        let dest_chain = self.paths.ancestor_chain(dest.id).await?;
        let physical = format!(
            "{}/{}",
            self.paths.physical_path(&dest_chain),
            node.storage_segment()
        );

        if let Err(e) = self.blob.put(&physical, data.clone()).await {
            self.nodes.delete_many(&[node.id]).await?;
            return Err(e);
        }

        // The recorded size is what storage actually holds, not what the
        // client claimed to send.
        let meta = self.blob.metadata(&physical).await?;
        let node = self.nodes.set_size(node.id, meta.size_bytes as i64).await?;

        tracing::info!(
            user_id = %actor.user_id,
            node_id = %node.id,
            folder_id = %dest.id,
            size = meta.size_bytes,
            "File uploaded"
        );
        Ok(node)
    }

    async fn check_quota(&self, dest: &Node, incoming: u64) -> AppResult<()> {
        let chain = self.paths.ancestor_chain(dest.id).await?;
        let root_id = chain[0].id;
        let used = self.sizes.subtree_size(root_id).await?;
        if used + incoming > self.storage.quota_bytes {
            return Err(AppError::validation("storage quota exceeded"));
        }
        Ok(())
    }
}
