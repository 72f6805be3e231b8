//! Authentication against the identity provider
//!
//! The provider owns users and tokens; this module only holds the active
//! session, refreshes the access token before it expires, and reads the
//! claims the storefront needs (username, realm roles).

pub mod claims;
pub mod keycloak;
pub mod provider;
pub mod session;

pub use claims::TokenClaims;
pub use keycloak::KeycloakProvider;
pub use provider::{AuthError, ProviderClient, TokenSet};
pub use session::{AuthSession, REFRESH_WINDOW_SECS};
