//! Shared test harness wiring the services against in-memory stores and
//! a temp-dir blob backend.

use std::path::PathBuf;
use std::sync::Arc;

use drivebox_auth::AccessResolver;
use drivebox_core::config::{InheritanceMode, ScanConfig, StorageConfig, TreeConfig};
use drivebox_core::traits::BlobStore;
use drivebox_database::{MemoryGrantStore, MemoryNodeStore};
use drivebox_entity::Node;
use drivebox_service::{Actor, PermissionService, TreeService, UploadService};
use drivebox_storage::{LocalBlobStore, SignatureScanner, StagingArea};
use uuid::Uuid;

pub struct TestHarness {
    _tmp: tempfile::TempDir,
    pub staging_dir: PathBuf,
    pub nodes: Arc<MemoryNodeStore>,
    pub grants: Arc<MemoryGrantStore>,
    pub blob: Arc<LocalBlobStore>,
    pub tree: TreeService,
    pub permissions: PermissionService,
    pub uploads: UploadService,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_config(
            TreeConfig::default(),
            StorageConfig::default(),
            ScanConfig::default(),
        )
        .await
    }

    pub async fn with_inheritance(mode: InheritanceMode) -> Self {
        let tree = TreeConfig {
            inheritance: mode,
            ..TreeConfig::default()
        };
        Self::with_config(tree, StorageConfig::default(), ScanConfig::default()).await
    }

    pub async fn with_config(
        tree_config: TreeConfig,
        storage_config: StorageConfig,
        scan_config: ScanConfig,
    ) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let data_root = tmp.path().join("data");
        let staging_dir = tmp.path().join("staging");

        let nodes = Arc::new(MemoryNodeStore::new());
        let grants = Arc::new(MemoryGrantStore::new());
        let blob = Arc::new(LocalBlobStore::new(&data_root).await.unwrap());
        let staging = StagingArea::new(&staging_dir).await.unwrap();
        let scanner = Arc::new(SignatureScanner::new());

        let resolver = Arc::new(AccessResolver::new(
            nodes.clone(),
            grants.clone(),
            tree_config.inheritance,
        ));

        let tree = TreeService::new(
            nodes.clone(),
            grants.clone(),
            blob.clone(),
            resolver.clone(),
            &tree_config,
        );
        let permissions = PermissionService::new(nodes.clone(), grants.clone());
        let uploads = UploadService::new(
            nodes.clone(),
            resolver,
            blob.clone(),
            staging,
            scanner,
            tree_config.max_depth,
            storage_config,
            scan_config,
        );

        Self {
            _tmp: tmp,
            staging_dir,
            nodes,
            grants,
            blob,
            tree,
            permissions,
            uploads,
        }
    }

    /// Create a fresh member with a provisioned root folder.
    pub async fn member_with_root(&self, root_name: &str) -> (Actor, Node) {
        let actor = Actor::member(Uuid::new_v4());
        let root = self.tree.create_root(&actor, root_name).await.unwrap();
        (actor, root)
    }

    /// Whether a node's physical path exists in the blob backend.
    pub async fn blob_exists(&self, node_id: Uuid) -> bool {
        let path = self.tree.paths().physical_path_of(node_id).await.unwrap();
        self.blob.exists(&path).await.unwrap()
    }

    /// Number of files currently sitting in the staging directory.
    pub fn staged_count(&self) -> usize {
        std::fs::read_dir(&self.staging_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// The EICAR antivirus test body every scanner flags.
pub fn eicar_body() -> bytes::Bytes {
    bytes::Bytes::from_static(
        b"X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*",
    )
}
