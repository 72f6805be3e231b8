//! Client error types

use thiserror::Error;

/// API error taxonomy
///
/// Non-2xx responses map onto distinguished kinds; a request that never
/// reached the server maps to `Unreachable` (the status-0 case).
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 - authentication required
    #[error("Unauthorized. Please login.")]
    Unauthorized,

    /// 403 - authenticated but not allowed
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Any other non-2xx, carries status and body text
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Request never reached the server
    #[error("Unable to connect to the server: {0}")]
    Unreachable(String),

    /// Body was not what the endpoint promised
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status associated with this error, 0 for connectivity failures
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Unreachable(_) => Some(0),
            _ => None,
        }
    }

    /// Whether this error signals a 4xx condition
    ///
    /// The retry policy in the query layer never retries these.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(status) if (400..500).contains(&status))
    }
}

/// Result type for client operations
pub type ApiResult<T> = Result<T, ApiError>;
