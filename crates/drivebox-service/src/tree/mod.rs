//! Tree operations: roots, folders, files, paths, sizes, moves, deletes.

mod lock;
mod path;
mod service;
mod size;

pub use lock::SubtreeLocks;
pub use path::PathResolver;
pub use service::{FolderListing, NodeInfo, TreeService};
pub use size::{SizeAggregator, StorageUsage};

pub(crate) use service::validate_name;
