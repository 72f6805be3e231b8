//! Mart Client - HTTP client for the TrustMart gateway
//!
//! Typed REST calls to the storefront gateway, an authentication session
//! backed by the identity provider, the session-scoped cart, and the query
//! cache the console pages fetch through.

pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod http;
pub mod query;

pub use auth::{AuthError, AuthSession, KeycloakProvider, ProviderClient, TokenClaims, TokenSet};
pub use cart::{Cart, CartLine};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use http::ApiClient;
pub use query::{QueryClient, QueryKey};

// Re-export shared types for convenience
pub use shared::models;
