//! # drivebox-entity
//!
//! Domain entities for DriveBox: tree nodes, permission grants, and user
//! roles. Entities are plain data; behavior lives in the service crates.

pub mod node;
pub mod permission;
pub mod user;

pub use node::{split_extension, CreateNode, Node, NodeKind};
pub use permission::{NodeAction, PermissionGrant};
pub use user::UserRole;
