//! Malware scanner abstraction.

use std::path::Path;

use async_trait::async_trait;

use crate::result::AppResult;

/// Result of scanning a single staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    /// Number of detections found in the file.
    pub detected: u32,
}

impl ScanReport {
    /// A report with no detections.
    pub fn clean() -> Self {
        Self { detected: 0 }
    }

    /// Whether the scanned file must be rejected.
    pub fn is_malicious(&self) -> bool {
        self.detected >= 1
    }
}

/// A malware scanner run against staged uploads before commit.
#[async_trait]
pub trait MalwareScanner: Send + Sync + std::fmt::Debug + 'static {
    /// Scan the file at `path` and report the number of detections.
    ///
    /// An unreachable or failing scanner is an error; uploads are never
    /// committed without a completed scan.
    async fn scan(&self, path: &Path) -> AppResult<ScanReport>;
}
