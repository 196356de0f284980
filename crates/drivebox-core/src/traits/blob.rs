//! Blob storage backend abstraction.
//!
//! Paths passed to a [`BlobStore`] are physical paths built from storage
//! identifiers, always relative to the backend root and using `/` as the
//! separator. Display names never reach this layer.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::result::AppResult;

/// Metadata about a stored blob or directory.
#[derive(Debug, Clone)]
pub struct BlobMeta {
    /// Physical path relative to the backend root.
    pub path: String,
    /// Size in bytes. Zero for directories.
    pub size_bytes: u64,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// Last modification time, if the backend tracks one.
    pub last_modified: Option<DateTime<Utc>>,
}

/// A physical storage backend.
///
/// Implementations must be safe to share across tasks. All operations are
/// keyed by physical path; the backend knows nothing about the virtual tree.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Short identifier for the backend, e.g. `"local"`.
    fn backend_type(&self) -> &str;

    /// Write the full contents of a blob, creating parent directories.
    async fn put(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Read the full contents of a blob.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Delete a single blob. Deleting a missing blob is not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Delete a directory and everything under it.
    async fn delete_dir(&self, path: &str) -> AppResult<()>;

    /// Create an empty directory, including missing parents.
    async fn create_dir(&self, path: &str) -> AppResult<()>;

    /// Move a blob or directory to a new physical path.
    async fn rename(&self, from: &str, to: &str) -> AppResult<()>;

    /// Check whether a blob or directory exists.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Read metadata for a blob or directory.
    async fn metadata(&self, path: &str) -> AppResult<BlobMeta>;
}
