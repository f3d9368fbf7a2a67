//! Bounded-concurrency request engine.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Notify, Semaphore};
use tracing::{debug, trace};

use crate::client::{RawResponse, RequestDescriptor, Transport, TransportError};

use super::types::DispatchStatus;

/// Counters shared by every task spawned from one dispatcher.
#[derive(Default)]
struct DispatchState {
    /// Requests enqueued whose completion handler has not returned yet.
    outstanding: AtomicUsize,
    /// Requests waiting for a concurrency permit.
    queued: AtomicUsize,
    /// Requests on the wire or running their completion handler.
    in_flight: AtomicUsize,
    completed: AtomicU64,
    transport_failures: AtomicU64,
    idle: Notify,
}

impl DispatchState {
    fn is_drained(&self) -> bool {
        self.outstanding.load(Ordering::SeqCst) == 0
    }
}

/// Releases a request's outstanding slot when dropped, including on panic
/// inside a completion handler.
struct OutstandingGuard {
    state: Arc<DispatchState>,
}

impl Drop for OutstandingGuard {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.state.completed.fetch_add(1, Ordering::Relaxed);
        if self.state.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.state.idle.notify_waiters();
        }
    }
}

/// Executes request descriptors with at most `max_concurrent` on the wire.
///
/// Each request gets a completion handler that receives the response (or the
/// transport failure) together with a clone of the dispatcher, so handlers can
/// enqueue follow-up requests. [`Dispatcher::drain`] waits for those as well.
///
/// Cloning yields another handle onto the same queue and permits.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    state: Arc<DispatchState>,
}

impl Dispatcher {
    /// Creates a dispatcher. `max_concurrent` is clamped to at least 1.
    pub fn new(transport: Arc<dyn Transport>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            transport,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            state: Arc::new(DispatchState::default()),
        }
    }

    /// Adds a request to the queue.
    ///
    /// May be called from inside another request's completion handler. Must be
    /// called from within a tokio runtime.
    pub fn enqueue<F, Fut>(&self, request: RequestDescriptor, on_complete: F)
    where
        F: FnOnce(Result<RawResponse, TransportError>, Dispatcher) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        // Counted before spawning so a drain started right after sees it.
        self.state.outstanding.fetch_add(1, Ordering::SeqCst);
        self.state.queued.fetch_add(1, Ordering::SeqCst);

        let dispatcher = self.clone();
        tokio::spawn(async move {
            let state = Arc::clone(&dispatcher.state);

            let permit = Arc::clone(&dispatcher.semaphore).acquire_owned().await;
            state.in_flight.fetch_add(1, Ordering::SeqCst);
            state.queued.fetch_sub(1, Ordering::SeqCst);
            let _guard = OutstandingGuard {
                state: Arc::clone(&state),
            };

            let result = match permit {
                Ok(_permit) => {
                    trace!(url = %request.url, "Dispatching request");
                    dispatcher.transport.send(&request).await
                }
                Err(_) => Err(TransportError::Request(
                    "dispatcher semaphore closed".to_string(),
                )),
            };

            if result.is_err() {
                state.transport_failures.fetch_add(1, Ordering::Relaxed);
            }

            on_complete(result, dispatcher).await;
        });
    }

    /// Waits until no request is queued or in flight.
    ///
    /// Requests enqueued by completion handlers while draining are awaited
    /// too; this only returns once the whole tree of work has finished.
    pub async fn drain(&self) {
        loop {
            let notified = self.state.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent notify is not lost.
            notified.as_mut().enable();

            if self.state.is_drained() {
                break;
            }

            notified.await;
        }

        debug!(
            completed = self.state.completed.load(Ordering::Relaxed),
            "Dispatcher drained"
        );
    }

    pub fn is_drained(&self) -> bool {
        self.state.is_drained()
    }

    pub fn status(&self) -> DispatchStatus {
        DispatchStatus {
            queued: self.state.queued.load(Ordering::SeqCst),
            in_flight: self.state.in_flight.load(Ordering::SeqCst),
            max_concurrent: self.max_concurrent,
            completed: self.state.completed.load(Ordering::Relaxed),
            transport_failures: self.state.transport_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockEndpoint, MockTransport};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready, task};

    const CONVERT: &str = "http://backend.test/repositories/2/jsonmodel_from_format/resource/ead";
    const UPLOAD: &str = "http://backend.test/repositories/2/batch_imports";

    #[tokio::test]
    async fn test_drain_on_empty_dispatcher_returns() {
        let dispatcher = Dispatcher::new(Arc::new(MockTransport::new()), 4);
        dispatcher.drain().await;
        assert!(dispatcher.is_drained());
    }

    #[tokio::test]
    async fn test_each_handler_runs_once() {
        let transport = Arc::new(MockTransport::new());
        let dispatcher = Dispatcher::new(transport.clone(), 2);
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let calls = Arc::clone(&calls);
            dispatcher.enqueue(RequestDescriptor::post(CONVERT), move |result, _| async move {
                assert!(result.is_ok());
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }

        dispatcher.drain().await;

        assert_eq!(calls.load(Ordering::SeqCst), 10);
        assert_eq!(transport.requests_to(MockEndpoint::Convert), 10);
        let status = dispatcher.status();
        assert_eq!(status.completed, 10);
        assert_eq!(status.queued, 0);
        assert_eq!(status.in_flight, 0);
    }

    #[tokio::test]
    async fn test_concurrency_bound_is_respected() {
        let transport = Arc::new(MockTransport::new());
        transport.set_latency(MockEndpoint::Convert, Duration::from_millis(20));
        let dispatcher = Dispatcher::new(transport.clone(), 3);

        for _ in 0..12 {
            dispatcher.enqueue(RequestDescriptor::post(CONVERT), |_, _| async {});
        }
        dispatcher.drain().await;

        assert!(transport.peak_concurrency() <= 3);
        assert_eq!(transport.requests_to(MockEndpoint::Convert), 12);
    }

    #[tokio::test]
    async fn test_drain_waits_for_requests_enqueued_by_handlers() {
        let transport = Arc::new(MockTransport::new());
        transport.set_latency(MockEndpoint::Upload, Duration::from_millis(50));
        let dispatcher = Dispatcher::new(transport.clone(), 4);
        let observed = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let observed = Arc::clone(&observed);
            dispatcher.enqueue(RequestDescriptor::post(CONVERT), move |_, handle| async move {
                observed.lock().unwrap().push(format!("convert-{}", i));
                handle.enqueue(RequestDescriptor::post(UPLOAD), move |_, _| async move {
                    observed.lock().unwrap().push(format!("upload-{}", i));
                });
            });
        }

        dispatcher.drain().await;

        let observed = observed.lock().unwrap();
        assert_eq!(observed.len(), 6);
        assert_eq!(
            observed.iter().filter(|s| s.starts_with("upload-")).count(),
            3
        );
        assert_eq!(transport.requests_to(MockEndpoint::Upload), 3);
    }

    #[tokio::test]
    async fn test_drain_stays_pending_while_follow_up_is_in_flight() {
        let transport = Arc::new(MockTransport::new());
        transport.set_latency(MockEndpoint::Upload, Duration::from_millis(100));
        let dispatcher = Dispatcher::new(transport.clone(), 1);
        let upload_done = Arc::new(AtomicUsize::new(0));

        let done = Arc::clone(&upload_done);
        dispatcher.enqueue(RequestDescriptor::post(CONVERT), move |_, handle| async move {
            handle.enqueue(RequestDescriptor::post(UPLOAD), move |_, _| async move {
                done.fetch_add(1, Ordering::SeqCst);
            });
        });

        // Let the convert finish and the upload start.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(transport.requests_to(MockEndpoint::Convert), 1);

        let mut drain = task::spawn(dispatcher.drain());
        assert_pending!(drain.poll());
        assert_eq!(upload_done.load(Ordering::SeqCst), 0);

        while !dispatcher.is_drained() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(drain.is_woken());
        assert_ready!(drain.poll());
        assert_eq!(upload_done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_reaches_handler() {
        let transport = Arc::new(MockTransport::new());
        transport.set_error(MockEndpoint::Convert, TransportError::Timeout);
        let dispatcher = Dispatcher::new(transport, 2);
        let failures = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&failures);
        dispatcher.enqueue(RequestDescriptor::post(CONVERT), move |result, _| async move {
            if matches!(result, Err(TransportError::Timeout)) {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        dispatcher.drain().await;

        assert_eq!(failures.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.status().transport_failures, 1);
    }

    #[tokio::test]
    async fn test_panicking_handler_does_not_wedge_drain() {
        let dispatcher = Dispatcher::new(Arc::new(MockTransport::new()), 1);
        dispatcher.enqueue(RequestDescriptor::post(CONVERT), |_, _| async {
            panic!("handler blew up");
        });

        tokio::time::timeout(Duration::from_secs(1), dispatcher.drain())
            .await
            .expect("drain should complete after a handler panic");
    }
}
