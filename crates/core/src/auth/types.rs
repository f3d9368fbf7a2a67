use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Session credential returned by the backend login endpoint.
///
/// Valid for one batch. Cloning is cheap, every request of the batch holds one.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Arc<str>);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::from(token.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Body of a successful `/users/{username}/login` call.
///
/// Only the session is consumed; the user record is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub session: Option<String>,
}
