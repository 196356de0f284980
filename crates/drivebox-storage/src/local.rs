//! Local filesystem blob storage backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;

use drivebox_core::traits::{BlobMeta, BlobStore};
use drivebox_core::{AppError, AppResult};

/// Blob store rooted at a directory on the local filesystem.
///
/// Physical paths are storage-identifier segments joined with `/`; no
/// display name ever appears on disk.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a backend rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Resolve a relative physical path against the backend root.
    ///
    /// Rejects absolute paths and traversal segments so a malformed path
    /// can never escape the root.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path);
        if relative.is_absolute() {
            return Err(AppError::storage(format!("absolute path rejected: {path}")));
        }
        for component in relative.components() {
            match component {
                std::path::Component::Normal(_) => {}
                _ => {
                    return Err(AppError::storage(format!(
                        "path traversal rejected: {path}"
                    )));
                }
            }
        }
        Ok(self.root.join(relative))
    }

    async fn ensure_parent(&self, full: &Path) -> AppResult<()> {
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn backend_type(&self) -> &str {
        "local"
    }

    async fn put(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full = self.resolve(path)?;
        self.ensure_parent(&full).await?;
        fs::write(&full, &data).await?;
        tracing::debug!(path = %path, size = data.len(), "Blob written");
        Ok(())
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full = self.resolve(path)?;
        match fs::read(&full).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found(format!("blob not found: {path}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_dir(&self, path: &str) -> AppResult<()> {
        let full = self.resolve(path)?;
        match fs::remove_dir_all(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_dir(&self, path: &str) -> AppResult<()> {
        let full = self.resolve(path)?;
        fs::create_dir_all(&full).await?;
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let from_full = self.resolve(from)?;
        let to_full = self.resolve(to)?;
        self.ensure_parent(&to_full).await?;
        fs::rename(&from_full, &to_full).await?;
        tracing::debug!(from = %from, to = %to, "Blob moved");
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full = self.resolve(path)?;
        Ok(fs::try_exists(&full).await?)
    }

    async fn metadata(&self, path: &str) -> AppResult<BlobMeta> {
        let full = self.resolve(path)?;
        let meta = match fs::metadata(&full).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::not_found(format!("blob not found: {path}")));
            }
            Err(e) => return Err(e.into()),
        };
        let last_modified = meta
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);
        Ok(BlobMeta {
            path: path.to_string(),
            size_bytes: if meta.is_dir() { 0 } else { meta.len() },
            is_directory: meta.is_dir(),
            last_modified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, LocalBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_put_and_read_round_trip() {
        let (_dir, store) = store().await;
        store
            .put("abc/def.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        let data = store.read_bytes("abc/def.txt").await.unwrap();
        assert_eq!(&data[..], b"hello");
    }

    #[tokio::test]
    async fn test_metadata_reports_size() {
        let (_dir, store) = store().await;
        store
            .put("k/file.bin", Bytes::from_static(b"12345"))
            .await
            .unwrap();
        let meta = store.metadata("k/file.bin").await.unwrap();
        assert_eq!(meta.size_bytes, 5);
        assert!(!meta.is_directory);
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let (_dir, store) = store().await;
        store.delete("nope/missing").await.unwrap();
        store.delete_dir("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_rename_moves_subtree() {
        let (_dir, store) = store().await;
        store.create_dir("a/b").await.unwrap();
        store
            .put("a/b/f.txt", Bytes::from_static(b"x"))
            .await
            .unwrap();
        store.rename("a/b", "c/b").await.unwrap();
        assert!(!store.exists("a/b").await.unwrap());
        assert_eq!(&store.read_bytes("c/b/f.txt").await.unwrap()[..], b"x");
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let (_dir, store) = store().await;
        assert!(store.read_bytes("../outside").await.is_err());
        assert!(store.read_bytes("/etc/passwd").await.is_err());
    }
}
