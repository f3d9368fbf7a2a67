//! HTTP plumbing: request descriptors, the transport seam and endpoint builders.

mod endpoints;
mod http;
mod traits;
mod types;

pub use endpoints::{BackendEndpoints, SESSION_HEADER};
pub use http::HttpTransport;
pub use traits::*;
pub use types::*;
