//! Request actor context.

use uuid::Uuid;

use drivebox_entity::UserRole;

/// The authenticated principal behind a service call.
///
/// Identity and role resolution happen upstream; services only see the
/// resolved triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
    pub is_superadmin: bool,
}

impl Actor {
    pub fn member(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::Member,
            is_superadmin: false,
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::Admin,
            is_superadmin: false,
        }
    }

    pub fn superadmin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::Admin,
            is_superadmin: true,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
