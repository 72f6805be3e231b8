//! Keycloak token client
//!
//! Speaks the OIDC token endpoints of a Keycloak realm. A terminal client
//! has no browser to redirect, so login uses the direct access grant
//! (`grant_type=password`); refresh and logout are the standard OIDC calls.

use super::{AuthError, ProviderClient, TokenSet};
use async_trait::async_trait;
use serde::Deserialize;

/// Token client for a Keycloak realm
#[derive(Debug, Clone)]
pub struct KeycloakProvider {
    http: reqwest::Client,
    base_url: String,
    realm: String,
    client_id: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: u64,
}

impl KeycloakProvider {
    /// Create a provider client for `{base_url}/realms/{realm}`
    pub fn new(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: {
                let url: String = base_url.into();
                url.trim_end_matches('/').to_string()
            },
            realm: realm.into(),
            client_id: client_id.into(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/{}",
            self.base_url, self.realm, name
        )
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenSet, AuthError> {
        let response = self
            .http
            .post(self.endpoint("token"))
            .form(form)
            .send()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected(body));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenSet {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        })
    }
}

#[async_trait]
impl ProviderClient for KeycloakProvider {
    async fn login(&self, username: &str, password: &str) -> Result<TokenSet, AuthError> {
        self.token_request(&[
            ("grant_type", "password"),
            ("client_id", &self.client_id),
            ("username", username),
            ("password", password),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("client_id", &self.client_id),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.endpoint("logout"))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected(body));
        }
        Ok(())
    }
}
