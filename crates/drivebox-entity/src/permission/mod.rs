mod action;
mod model;

pub use action::NodeAction;
pub use model::PermissionGrant;
