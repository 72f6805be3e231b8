//! HTTP request machinery for the gateway API
//!
//! One `ApiClient` per process. Authenticated requests ask the auth session
//! for a bearer token before every call; the session refreshes it when it is
//! about to expire. No retries happen here - the retry policy lives in the
//! query layer.

use crate::auth::AuthSession;
use crate::{ApiError, ApiResult, ClientConfig};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// HTTP client for the storefront gateway
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Option<Arc<AuthSession>>,
}

impl ApiClient {
    /// Create a new API client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth: None,
        }
    }

    /// Attach the auth session used to resolve bearer tokens
    pub fn with_auth(mut self, auth: Arc<AuthSession>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Gateway base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Resolve the bearer token for an authenticated request.
    ///
    /// A failed refresh clears the session; the request then goes out
    /// without a header and the gateway answers 401.
    async fn bearer(&self) -> Option<String> {
        match &self.auth {
            Some(auth) => auth.bearer_token().await,
            None => None,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
        authenticated: bool,
    ) -> ApiResult<reqwest::Response> {
        let mut request = self.client.request(method, self.url(path));

        if authenticated {
            if let Some(token) = self.bearer().await {
                request = request.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))
    }

    /// Map a non-2xx response onto the error taxonomy
    async fn fail(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(body),
            _ => ApiError::Http {
                status: status.as_u16(),
                body,
            },
        }
    }

    async fn handle_json<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Success path for endpoints with an empty or non-JSON body
    async fn handle_unit(response: reqwest::Response) -> ApiResult<()> {
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(())
    }

    // ========== Request helpers (used by the api modules) ==========

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.send(Method::GET, path, None::<&()>, true).await?;
        Self::handle_json(response).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.send(Method::POST, path, Some(body), true).await?;
        Self::handle_json(response).await
    }

    pub(crate) async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<()> {
        let response = self.send(Method::POST, path, Some(body), true).await?;
        Self::handle_unit(response).await
    }

    pub(crate) async fn post_empty(&self, path: &str) -> ApiResult<()> {
        let response = self.send(Method::POST, path, None::<&()>, true).await?;
        Self::handle_unit(response).await
    }

    /// POST without a bearer token (public endpoints)
    pub(crate) async fn post_public<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.send(Method::POST, path, Some(body), false).await?;
        Self::handle_json(response).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.send(Method::PUT, path, Some(body), true).await?;
        Self::handle_json(response).await
    }

    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.send(Method::PATCH, path, Some(body), true).await?;
        Self::handle_json(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> ApiResult<()> {
        let response = self.send(Method::DELETE, path, None::<&()>, true).await?;
        Self::handle_unit(response).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.auth.is_some())
            .finish()
    }
}
