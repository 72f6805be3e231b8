//! Client configuration

use crate::auth::{AuthSession, ProviderClient};
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for connecting to the storefront gateway
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway base URL (e.g., "http://localhost:8083")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Where to persist the active auth session for silent restore.
    /// None disables persistence.
    pub session_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            session_file: None,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the session persistence file
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Create an API client from this configuration
    pub fn build_api_client(&self) -> super::ApiClient {
        super::ApiClient::new(self)
    }

    /// Create an auth session from this configuration
    ///
    /// The session persists to `session_file` when one is configured.
    pub fn build_auth_session(&self, provider: Arc<dyn ProviderClient>) -> AuthSession {
        AuthSession::new(provider, self.session_file.clone())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8083")
    }
}
