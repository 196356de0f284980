//! User roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse role carried by every actor.
///
/// Admins are further qualified by a superadmin flag resolved by the
/// identity layer; a plain admin has no implicit access to member trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Member,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member => f.write_str("member"),
            Self::Admin => f.write_str("admin"),
        }
    }
}
