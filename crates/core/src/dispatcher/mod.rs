//! Request dispatcher for the ingest pipeline.
//!
//! The [`Dispatcher`] runs HTTP request descriptors on the tokio runtime,
//! bounded by a semaphore, and hands each response to a completion handler.
//! Handlers may enqueue further requests (the upload that follows a
//! successful conversion); [`Dispatcher::drain`] returns only once the queue
//! is empty and nothing is in flight.
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = Dispatcher::new(transport, 4);
//! dispatcher.enqueue(convert_request, move |result, handle| async move {
//!     if let Ok(response) = result {
//!         handle.enqueue(upload_request, |_, _| async {});
//!     }
//! });
//! dispatcher.drain().await;
//! ```

mod engine;
mod types;

pub use engine::Dispatcher;
pub use types::DispatchStatus;
