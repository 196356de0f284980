//! PostgreSQL-backed store implementations.

mod grant;
mod node;

pub use grant::PgGrantStore;
pub use node::PgNodeStore;

use drivebox_core::error::ErrorKind;
use drivebox_core::AppError;

/// Map a database error to an application error, translating known
/// constraint violations into conflicts.
fn map_db_error(err: sqlx::Error, context: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(constraint) = db_err.constraint() {
            let message = match constraint {
                "nodes_parent_name_key" => Some("a sibling with this name already exists"),
                "nodes_owner_root_key" => Some("user already has a root folder"),
                "nodes_storage_id_key" => Some("storage identifier collision"),
                "nodes_parent_id_fkey" => Some("parent folder does not exist"),
                "permission_grants_user_node_key" => {
                    Some("a grant already exists for this user and node")
                }
                "permission_grants_node_id_fkey" => Some("node does not exist"),
                _ => None,
            };
            if let Some(message) = message {
                return AppError::conflict(message);
            }
        }
    }
    AppError::with_source(ErrorKind::Database, context, err)
}
