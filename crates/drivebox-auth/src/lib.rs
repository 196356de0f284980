//! # drivebox-auth
//!
//! Access resolution for DriveBox trees. Decides whether an actor may
//! perform an action on a node by layering ownership, role bypasses,
//! direct grants, and folder-chain inheritance.

pub mod acl;

pub use acl::{AccessDecision, AccessResolver, AccessSource};
