//! Tree shape and permission inheritance configuration.

use serde::{Deserialize, Serialize};

/// How far a file looks up the folder chain for an inherited grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritanceMode {
    /// A file without a direct grant falls back to its containing folder only.
    ParentOnly,
    /// A file without a direct grant walks every ancestor folder up to the root.
    FullChain,
}

impl Default for InheritanceMode {
    fn default() -> Self {
        Self::ParentOnly
    }
}

/// Virtual tree configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum nesting depth of the folder tree, root included.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Grant inheritance strategy for files.
    #[serde(default)]
    pub inheritance: InheritanceMode,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            inheritance: InheritanceMode::default(),
        }
    }
}

fn default_max_depth() -> u32 {
    32
}
