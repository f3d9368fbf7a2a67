use async_trait::async_trait;
use thiserror::Error;

use super::types::SessionToken;
use crate::client::TransportError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Login rejected with HTTP {status}")]
    Rejected { status: u16 },

    #[error("Login response could not be parsed: {0}")]
    MalformedResponse(String),

    #[error("Login response did not contain a session")]
    MissingSession,

    #[error("Login request failed: {0}")]
    Transport(#[from] TransportError),
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange the configured credentials for a fresh session token
    async fn authorize(&self) -> Result<SessionToken, AuthError>;

    /// Name of this authentication method
    fn method_name(&self) -> &'static str;
}
