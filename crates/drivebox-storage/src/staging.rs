//! Upload staging area.
//!
//! Uploads are written here before they are scanned. Nothing in the
//! staging directory is ever served; staged files are either committed
//! into the blob store or discarded.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;

use drivebox_core::types::storage_key;
use drivebox_core::AppResult;

/// A directory holding uploads between receipt and scan verdict.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Open a staging area at `dir`, creating the directory if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Write upload bytes to a fresh staging file and return its path.
    ///
    /// The staged name is a random key plus the upload's file name so
    /// concurrent uploads of the same name never collide.
    pub async fn stage(&self, file_name: &str, data: &Bytes) -> AppResult<PathBuf> {
        let safe_name = Path::new(file_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let staged = self.dir.join(format!("{}-{safe_name}", storage_key::generate()));
        fs::write(&staged, data).await?;
        Ok(staged)
    }

    /// Remove a staged file. Best effort; a failure is logged, not raised.
    pub async fn discard(&self, staged: &Path) {
        if let Err(e) = fs::remove_file(staged).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %staged.display(), error = %e, "Failed to remove staged upload");
            }
        }
    }
}
