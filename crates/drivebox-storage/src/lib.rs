//! # drivebox-storage
//!
//! Physical storage for DriveBox: the local filesystem blob backend, the
//! upload staging area, and the signature-based malware scanner.

pub mod local;
pub mod scanner;
pub mod staging;

pub use local::LocalBlobStore;
pub use scanner::SignatureScanner;
pub use staging::StagingArea;
