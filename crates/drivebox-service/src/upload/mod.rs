mod pipeline;

pub use pipeline::{UploadRequest, UploadService};
