//! Node kind discriminator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use drivebox_core::AppError;

/// Whether a node is a folder or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "node_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folder" => Ok(Self::Folder),
            "file" => Ok(Self::File),
            other => Err(AppError::validation(format!("unknown node kind: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        assert_eq!("folder".parse::<NodeKind>().unwrap(), NodeKind::Folder);
        assert_eq!(NodeKind::File.to_string(), "file");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!("symlink".parse::<NodeKind>().is_err());
    }
}
