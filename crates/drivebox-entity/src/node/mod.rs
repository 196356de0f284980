mod kind;
mod model;

pub use kind::NodeKind;
pub use model::{split_extension, CreateNode, Node};
