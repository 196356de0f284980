//! Permission grant model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::NodeAction;

/// A set of actions granted to one user on one node.
///
/// At most one grant exists per (user, node) pair; updates replace the
/// action set rather than accumulating rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub node_id: Uuid,
    pub actions: Vec<NodeAction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PermissionGrant {
    pub fn allows(&self, action: NodeAction) -> bool {
        self.actions.contains(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows() {
        let grant = PermissionGrant {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            node_id: Uuid::new_v4(),
            actions: vec![NodeAction::Read, NodeAction::Write],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(grant.allows(NodeAction::Read));
        assert!(!grant.allows(NodeAction::Delete));
    }
}
