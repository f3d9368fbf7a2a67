use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

use super::{AuthError, Authenticator, LoginResponse, SessionToken};
use crate::client::{BackendEndpoints, Transport};
use crate::config::BackendConfig;

/// Authenticator that logs in with the configured username and password.
pub struct PasswordAuthenticator {
    transport: Arc<dyn Transport>,
    endpoints: BackendEndpoints,
    username: String,
    password: String,
}

impl PasswordAuthenticator {
    pub fn new(transport: Arc<dyn Transport>, config: &BackendConfig) -> Self {
        Self {
            transport,
            endpoints: BackendEndpoints::new(config),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    fn parse_session(body: &str) -> Result<SessionToken, AuthError> {
        let login: LoginResponse = serde_json::from_str(body)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;

        match login.session {
            Some(session) if !session.is_empty() => Ok(SessionToken::new(session)),
            _ => Err(AuthError::MissingSession),
        }
    }
}

#[async_trait]
impl Authenticator for PasswordAuthenticator {
    async fn authorize(&self) -> Result<SessionToken, AuthError> {
        let request = self.endpoints.login_request(&self.username, &self.password);

        let result = match self.transport.send(&request).await {
            Ok(response) if response.is_ok() => Self::parse_session(&response.body),
            Ok(response) => Err(AuthError::Rejected {
                status: response.status,
            }),
            Err(e) => Err(AuthError::Transport(e)),
        };

        match &result {
            Ok(_) => debug!(username = %self.username, "Acquired backend session"),
            Err(e) => error!(username = %self.username, error = %e, "Failed to acquire auth"),
        }

        result
    }

    fn method_name(&self) -> &'static str {
        "password"
    }
}
