mod password;
mod traits;
mod types;

pub use password::*;
pub use traits::*;
pub use types::*;

use std::sync::Arc;

use crate::client::Transport;
use crate::config::BackendConfig;

/// Factory function to create the authenticator for a backend
pub fn create_authenticator(
    transport: Arc<dyn Transport>,
    config: &BackendConfig,
) -> Arc<dyn Authenticator> {
    Arc::new(PasswordAuthenticator::new(transport, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    #[test]
    fn test_create_authenticator_password() {
        let config = BackendConfig {
            uri: "http://backend.test".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            repository_id: 2,
            converter_method: "ead".to_string(),
        };
        let auth = create_authenticator(Arc::new(MockTransport::new()), &config);
        assert_eq!(auth.method_name(), "password");
    }
}
