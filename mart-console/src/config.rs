//! Console configuration
//!
//! All settings come from environment variables (a `.env` file is loaded
//! first) with local-development defaults.
//!
//! | Environment variable | Default |
//! |----------------------|---------|
//! | API_BASE_URL | http://localhost:8083 |
//! | KEYCLOAK_URL | http://localhost:8080 |
//! | KEYCLOAK_REALM | trustmart |
//! | KEYCLOAK_CLIENT_ID | mart-console |
//! | MART_DATA_DIR | .trustmart |

use std::path::PathBuf;

/// Console configuration
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Gateway base URL
    pub api_base_url: String,
    /// Identity provider base URL
    pub keycloak_url: String,
    /// Identity provider realm
    pub keycloak_realm: String,
    /// OIDC client id for this console
    pub keycloak_client_id: String,
    /// Directory for the persisted session
    pub data_dir: PathBuf,
}

impl ConsoleConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            api_base_url: std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8083".into()),
            keycloak_url: std::env::var("KEYCLOAK_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            keycloak_realm: std::env::var("KEYCLOAK_REALM").unwrap_or_else(|_| "trustmart".into()),
            keycloak_client_id: std::env::var("KEYCLOAK_CLIENT_ID")
                .unwrap_or_else(|_| "mart-console".into()),
            data_dir: std::env::var("MART_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".trustmart")),
        }
    }

    /// Where the active session is persisted
    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}
