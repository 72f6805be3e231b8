//! Identity provider abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Auth error type
#[derive(Debug, Error)]
pub enum AuthError {
    /// Provider rejected the request (bad credentials, expired refresh token)
    #[error("Provider rejected request: {0}")]
    Rejected(String),

    /// Provider could not be reached
    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    /// Token could not be interpreted
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// IO error (session persistence)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error (session persistence)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tokens issued by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds, from the token response
    #[serde(default)]
    pub expires_in: u64,
}

/// Client for the identity provider's token endpoints
///
/// The concrete implementation is [`KeycloakProvider`](super::KeycloakProvider);
/// tests substitute their own.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Exchange credentials for tokens
    async fn login(&self, username: &str, password: &str) -> Result<TokenSet, AuthError>;

    /// Exchange a refresh token for fresh tokens
    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthError>;

    /// Invalidate the session at the provider
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;
}
