//! # drivebox-database
//!
//! Persistence layer for DriveBox. Defines the [`NodeStore`] and
//! [`GrantStore`] traits, their PostgreSQL implementations, and in-memory
//! implementations used by tests and ephemeral deployments.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::{MemoryGrantStore, MemoryNodeStore};
pub use repositories::{PgGrantStore, PgNodeStore};
pub use store::{GrantStore, NodeStore};
