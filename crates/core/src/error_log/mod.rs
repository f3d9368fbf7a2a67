//! Error-response log.
//!
//! Failed requests have their raw response body (or failure detail) written
//! to a separate append-only file so the ingest log stays readable. Entries
//! travel over a channel to a single writer task.

mod events;
mod handle;
mod writer;

pub use events::*;
pub use handle::*;
pub use writer::*;
