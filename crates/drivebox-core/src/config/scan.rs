//! Malware scan configuration.

use serde::{Deserialize, Serialize};

/// Upload scanning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Whether uploads are scanned before commit.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Timeout in seconds for a single scan before the upload is rejected.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}
