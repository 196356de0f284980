//! Shared value types.

pub mod pagination;
pub mod size;
pub mod storage_key;

pub use pagination::{PageRequest, PageResponse};
