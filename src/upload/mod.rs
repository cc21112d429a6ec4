//! Turns a file selection or a URL/title pair into something the resource
//! tree can store.

mod link;
mod payload;

pub use link::LinkRequest;
pub use payload::{DEFAULT_MAX_UPLOAD_BYTES, FilePayload, PayloadError, UploadSource};
