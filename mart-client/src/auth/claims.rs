//! JWT payload inspection
//!
//! The client never verifies signatures - that is the gateway's job. It
//! only reads the payload fields it renders and the expiry used for the
//! refresh window.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

/// Claims the storefront reads from an access token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiry as a Unix timestamp
    pub exp: Option<u64>,
    /// Display username
    pub preferred_username: Option<String>,
    /// Realm roles used for authorization decisions
    pub realm_roles: Vec<String>,
}

impl TokenClaims {
    /// Decode the payload segment of a JWT
    ///
    /// Returns None for anything that is not a three-part token with a
    /// JSON payload.
    pub fn parse(token: &str) -> Option<Self> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return None;
        }

        let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
        let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).ok()?;

        let realm_roles = payload
            .pointer("/realm_access/roles")
            .and_then(|roles| roles.as_array())
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(|role| role.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            exp: payload.get("exp").and_then(|exp| exp.as_u64()),
            preferred_username: payload
                .get("preferred_username")
                .and_then(|name| name.as_str())
                .map(str::to_string),
            realm_roles,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::fake_jwt;
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_username_roles_and_expiry() {
        let token = fake_jwt(&json!({
            "exp": 1_900_000_000u64,
            "preferred_username": "alice",
            "realm_access": { "roles": ["ADMIN", "CLIENT"] }
        }));

        let claims = TokenClaims::parse(&token).unwrap();
        assert_eq!(claims.exp, Some(1_900_000_000));
        assert_eq!(claims.preferred_username.as_deref(), Some("alice"));
        assert_eq!(claims.realm_roles, vec!["ADMIN", "CLIENT"]);
    }

    #[test]
    fn missing_realm_access_means_no_roles() {
        let token = fake_jwt(&json!({ "preferred_username": "bob" }));
        let claims = TokenClaims::parse(&token).unwrap();
        assert!(claims.realm_roles.is_empty());
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(TokenClaims::parse("not-a-jwt").is_none());
        assert!(TokenClaims::parse("a.!!!.c").is_none());
    }
}
