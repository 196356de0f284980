//! # drivebox-service
//!
//! Business logic for DriveBox. [`TreeService`] owns folder and file tree
//! operations, [`PermissionService`] manages grants, and [`UploadService`]
//! runs the staged, scanned upload pipeline.

pub mod context;
pub mod permission;
pub mod tree;
pub mod upload;

pub use context::Actor;
pub use permission::PermissionService;
pub use tree::{FolderListing, NodeInfo, StorageUsage, TreeService};
pub use upload::{UploadRequest, UploadService};
