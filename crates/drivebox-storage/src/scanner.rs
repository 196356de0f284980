//! Signature-based malware scanner.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use drivebox_core::traits::{MalwareScanner, ScanReport};
use drivebox_core::{AppError, AppResult};

/// The EICAR antivirus test string. Any scanner must flag it.
const EICAR_SIGNATURE: &[u8] =
    b"X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*";

/// Scanner that matches staged files against a list of byte signatures.
#[derive(Debug, Clone)]
pub struct SignatureScanner {
    signatures: Vec<Vec<u8>>,
}

impl Default for SignatureScanner {
    fn default() -> Self {
        Self {
            signatures: vec![EICAR_SIGNATURE.to_vec()],
        }
    }
}

impl SignatureScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scanner with additional signatures beyond the default set.
    pub fn with_signatures(mut self, extra: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.signatures.extend(extra);
        self
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

#[async_trait]
impl MalwareScanner for SignatureScanner {
    async fn scan(&self, path: &Path) -> AppResult<ScanReport> {
        let data = fs::read(path).await.map_err(|e| {
            AppError::with_source(
                drivebox_core::error::ErrorKind::BackendUnavailable,
                format!("scanner could not read staged file: {}", path.display()),
                e,
            )
        })?;

        let detected = self
            .signatures
            .iter()
            .filter(|sig| contains(&data, sig))
            .count() as u32;

        Ok(ScanReport { detected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clean_file_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.txt");
        fs::write(&path, b"just an ordinary document").await.unwrap();

        let report = SignatureScanner::new().scan(&path).await.unwrap();
        assert!(!report.is_malicious());
    }

    #[tokio::test]
    async fn test_eicar_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evil.txt");
        let mut data = b"prefix ".to_vec();
        data.extend_from_slice(EICAR_SIGNATURE);
        fs::write(&path, &data).await.unwrap();

        let report = SignatureScanner::new().scan(&path).await.unwrap();
        assert!(report.is_malicious());
        assert_eq!(report.detected, 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SignatureScanner::new()
            .scan(&dir.path().join("gone"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, drivebox_core::error::ErrorKind::BackendUnavailable);
    }
}
