//! Status lines, header lists and response bodies.

mod body;
mod header;
mod status;

pub mod latin1;

pub use body::{Body, Bytes, Release};
pub use header::{Headers, Iter, CONTENT_LENGTH, CONTENT_TYPE};
pub use status::Status;

pub use http::StatusCode;
