//! Canonical actions a grant can allow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use drivebox_core::AppError;

/// An action on a node that can be granted to a non-owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeAction {
    Read,
    Write,
    Delete,
}

impl NodeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for NodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            other => Err(AppError::validation(format!("unknown action: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&NodeAction::Delete).unwrap();
        assert_eq!(json, "\"delete\"");
        let back: NodeAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NodeAction::Delete);
    }
}
