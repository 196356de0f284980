//! In-memory store implementations.
//!
//! These enforce the same uniqueness rules as the PostgreSQL schema so
//! service behavior matches across backends. Used by tests and ephemeral
//! single-process deployments.

mod grant;
mod node;

pub use grant::MemoryGrantStore;
pub use node::MemoryNodeStore;
