//! Tree node model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use drivebox_core::types::storage_key;

use super::NodeKind;

/// A node in a user's virtual tree.
///
/// `storage_id` is assigned at creation and never changes; it is the only
/// name the physical backend ever sees. `name` is the display name shown
/// to users and may be renamed freely.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Node {
    pub id: Uuid,
    pub storage_id: String,
    pub name: String,
    pub kind: NodeKind,
    pub owner_id: Uuid,
    /// `None` only for the per-user root folder.
    pub parent_id: Option<Uuid>,
    /// Byte size read back from storage after commit. `None` for folders.
    pub size_bytes: Option<i64>,
    /// Original file extension, without the dot. `None` for folders and
    /// extensionless files.
    pub extension: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// The backend-facing name of this node within its parent directory.
    ///
    /// Files keep their original extension so type detection keeps working
    /// on the physical side.
    pub fn storage_segment(&self) -> String {
        match &self.extension {
            Some(ext) if self.is_file() => format!("{}.{ext}", self.storage_id),
            _ => self.storage_id.clone(),
        }
    }
}

/// Input for creating a node. The storage identifier is generated here so
/// callers never pick their own.
#[derive(Debug, Clone)]
pub struct CreateNode {
    pub storage_id: String,
    pub name: String,
    pub kind: NodeKind,
    pub owner_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub size_bytes: Option<i64>,
    pub extension: Option<String>,
}

impl CreateNode {
    /// Build input for a new folder.
    pub fn folder(name: impl Into<String>, owner_id: Uuid, parent_id: Option<Uuid>) -> Self {
        Self {
            storage_id: storage_key::generate(),
            name: name.into(),
            kind: NodeKind::Folder,
            owner_id,
            parent_id,
            size_bytes: None,
            extension: None,
        }
    }

    /// Build input for a new file under `parent_id`.
    ///
    /// The extension is split off the display name; `size_bytes` stays
    /// unset until the blob is committed and measured.
    pub fn file(name: impl Into<String>, owner_id: Uuid, parent_id: Uuid) -> Self {
        let name = name.into();
        let extension = split_extension(&name).map(str::to_owned);
        Self {
            storage_id: storage_key::generate(),
            name,
            kind: NodeKind::File,
            owner_id,
            parent_id: Some(parent_id),
            size_bytes: None,
            extension,
        }
    }
}

/// Extract the extension from a display name, if any.
///
/// A leading dot alone (e.g. `.gitignore`) does not count as an extension.
pub fn split_extension(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}
