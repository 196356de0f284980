//! Storage configuration.

use serde::{Deserialize, Serialize};

/// Blob storage and upload limits configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding all user trees on the local backend.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Directory used to stage uploads before they are scanned.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
    /// Maximum accepted size of a single upload, in bytes.
    #[serde(default = "default_max_upload_size_bytes")]
    pub max_upload_size_bytes: u64,
    /// Per-user storage quota, in bytes.
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            staging_dir: default_staging_dir(),
            max_upload_size_bytes: default_max_upload_size_bytes(),
            quota_bytes: default_quota_bytes(),
        }
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_staging_dir() -> String {
    "./data/staging".to_string()
}

fn default_max_upload_size_bytes() -> u64 {
    // 2 GiB
    2 * 1024 * 1024 * 1024
}

fn default_quota_bytes() -> u64 {
    // 10 GiB
    10 * 1024 * 1024 * 1024
}
