//! Collaborator traits implemented by backend crates.

pub mod blob;
pub mod scanner;

pub use blob::{BlobMeta, BlobStore};
pub use scanner::{MalwareScanner, ScanReport};
