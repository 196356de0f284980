//! # drivebox-core
//!
//! Core crate for DriveBox. Contains collaborator traits, configuration
//! schemas, shared value types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DriveBox crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
