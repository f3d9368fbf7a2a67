//! Mock authenticator for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::auth::{AuthError, Authenticator, SessionToken};

/// Mock implementation of the Authenticator trait.
///
/// Hands out `session-1`, `session-2`, ... and counts calls. A failure can be
/// scheduled for the n-th call to simulate the backend rejecting a login
/// part-way through a run.
#[derive(Debug, Default)]
pub struct MockAuthenticator {
    calls: AtomicUsize,
    fail_on_call: Mutex<Option<usize>>,
}

impl MockAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `call`-th authorization (1-based) and every one after it.
    pub fn fail_from_call(&self, call: usize) {
        *self.fail_on_call.lock().unwrap() = Some(call);
    }

    /// Number of times `authorize` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn authorize(&self) -> Result<SessionToken, AuthError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let fail_from = *self.fail_on_call.lock().unwrap();

        match fail_from {
            Some(n) if call >= n => Err(AuthError::Rejected { status: 403 }),
            _ => Ok(SessionToken::new(format!("session-{}", call))),
        }
    }

    fn method_name(&self) -> &'static str {
        "mock"
    }
}
