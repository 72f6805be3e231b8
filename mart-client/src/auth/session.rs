//! Active session state
//!
//! Holds the tokens for the logged-in user and answers every "who am I"
//! question the console asks. `bearer_token` transparently refreshes the
//! access token when it is inside the refresh window; a failed refresh
//! forces a logout.
//!
//! The session is persisted to disk on login and refresh so a restart can
//! silently restore it - the terminal equivalent of the browser SSO check.

use super::claims::TokenClaims;
use super::provider::{AuthError, ProviderClient, TokenSet};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Refresh the access token when it expires within this many seconds
pub const REFRESH_WINDOW_SECS: u64 = 30;

/// Persisted session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActiveSession {
    tokens: TokenSet,
    /// Access token expiry as a Unix timestamp
    expires_at: Option<u64>,
    claims: TokenClaims,
}

impl ActiveSession {
    fn from_tokens(tokens: TokenSet) -> Self {
        let claims = TokenClaims::parse(&tokens.access_token).unwrap_or_default();
        let expires_at = claims.exp.or_else(|| {
            (tokens.expires_in > 0).then(|| now_secs() + tokens.expires_in)
        });
        Self {
            tokens,
            expires_at,
            claims,
        }
    }

    fn expires_within(&self, seconds: u64) -> bool {
        match self.expires_at {
            Some(expires_at) => now_secs() + seconds >= expires_at,
            // No expiry claim: treat as always stale so every use refreshes
            None => true,
        }
    }
}

/// Authentication session backed by the identity provider
pub struct AuthSession {
    provider: Arc<dyn ProviderClient>,
    session_file: Option<PathBuf>,
    state: RwLock<Option<ActiveSession>>,
}

impl AuthSession {
    /// Create a logged-out session
    pub fn new(provider: Arc<dyn ProviderClient>, session_file: Option<PathBuf>) -> Self {
        Self {
            provider,
            session_file,
            state: RwLock::new(None),
        }
    }

    /// Silently restore a persisted session, if one exists and is current
    pub async fn init(&self) {
        let Some(path) = &self.session_file else {
            return;
        };
        if !path.exists() {
            return;
        }

        let session = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str::<ActiveSession>(&content).ok());

        match session {
            Some(session) if !session.expires_within(0) => {
                tracing::info!(
                    username = session.claims.preferred_username.as_deref().unwrap_or("?"),
                    "Restored persisted session"
                );
                *self.state.write().await = Some(session);
            }
            Some(_) => {
                tracing::info!("Persisted session expired, cleared");
                let _ = std::fs::remove_file(path);
            }
            None => {
                let _ = std::fs::remove_file(path);
            }
        }
    }

    /// Log in with credentials
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let tokens = self.provider.login(username, password).await?;
        let session = ActiveSession::from_tokens(tokens);
        self.persist(&session);
        *self.state.write().await = Some(session);
        tracing::info!(username = %username, "Logged in");
        Ok(())
    }

    /// Log out, invalidating the provider session best-effort
    pub async fn logout(&self) {
        let session = self.state.write().await.take();
        self.clear_persisted();

        if let Some(session) = session {
            if let Err(e) = self.provider.logout(&session.tokens.refresh_token).await {
                tracing::warn!("Provider logout failed: {}", e);
            }
        }
    }

    /// Whether a session is active
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Display username from the token claims
    pub async fn username(&self) -> Option<String> {
        self.state
            .read()
            .await
            .as_ref()
            .and_then(|s| s.claims.preferred_username.clone())
    }

    /// Realm roles from the token claims
    pub async fn roles(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|s| s.claims.realm_roles.clone())
            .unwrap_or_default()
    }

    pub async fn is_admin(&self) -> bool {
        self.has_role("ADMIN").await
    }

    pub async fn is_client(&self) -> bool {
        self.has_role("CLIENT").await
    }

    async fn has_role(&self, role: &str) -> bool {
        self.state
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.claims.realm_roles.iter().any(|r| r == role))
    }

    /// A bearer token valid for at least the refresh window
    ///
    /// Refreshes first when the current token expires within
    /// [`REFRESH_WINDOW_SECS`]. A failed refresh clears the session and
    /// returns None.
    pub async fn bearer_token(&self) -> Option<String> {
        {
            let state = self.state.read().await;
            let session = state.as_ref()?;
            if !session.expires_within(REFRESH_WINDOW_SECS) {
                return Some(session.tokens.access_token.clone());
            }
        }

        let mut state = self.state.write().await;
        let session = state.as_ref()?;
        // Another caller may have refreshed while we waited for the lock
        if !session.expires_within(REFRESH_WINDOW_SECS) {
            return Some(session.tokens.access_token.clone());
        }

        match self.provider.refresh(&session.tokens.refresh_token).await {
            Ok(tokens) => {
                let refreshed = ActiveSession::from_tokens(tokens);
                let token = refreshed.tokens.access_token.clone();
                self.persist(&refreshed);
                *state = Some(refreshed);
                tracing::debug!("Access token refreshed");
                Some(token)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed, logging out: {}", e);
                *state = None;
                self.clear_persisted();
                None
            }
        }
    }

    fn persist(&self, session: &ActiveSession) {
        let Some(path) = &self.session_file else {
            return;
        };
        let write = || -> Result<(), AuthError> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(session)?;
            std::fs::write(path, content)?;
            Ok(())
        };
        if let Err(e) = write() {
            tracing::warn!("Failed to persist session: {}", e);
        }
    }

    fn clear_persisted(&self) {
        if let Some(path) = &self.session_file {
            let _ = std::fs::remove_file(path);
        }
    }
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::test_support::fake_jwt;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        login_token: Mutex<Option<TokenSet>>,
        refresh_result: Mutex<Result<TokenSet, String>>,
        refresh_calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(login_token: TokenSet, refresh_result: Result<TokenSet, String>) -> Arc<Self> {
            Arc::new(Self {
                login_token: Mutex::new(Some(login_token)),
                refresh_result: Mutex::new(refresh_result),
                refresh_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProviderClient for MockProvider {
        async fn login(&self, _username: &str, _password: &str) -> Result<TokenSet, AuthError> {
            Ok(self.login_token.lock().unwrap().take().unwrap())
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<TokenSet, AuthError> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            self.refresh_result
                .lock()
                .unwrap()
                .clone()
                .map_err(AuthError::Rejected)
        }

        async fn logout(&self, _refresh_token: &str) -> Result<(), AuthError> {
            Ok(())
        }
    }

    fn token_expiring_in(seconds: i64, roles: &[&str]) -> TokenSet {
        let exp = now_secs() as i64 + seconds;
        TokenSet {
            access_token: fake_jwt(&json!({
                "exp": exp,
                "preferred_username": "alice",
                "realm_access": { "roles": roles }
            })),
            refresh_token: "refresh".into(),
            expires_in: 0,
        }
    }

    #[tokio::test]
    async fn login_exposes_claims() {
        let provider = MockProvider::new(
            token_expiring_in(3600, &["ADMIN", "CLIENT"]),
            Err("unused".into()),
        );
        let session = AuthSession::new(provider, None);

        assert!(!session.is_authenticated().await);
        session.login("alice", "secret").await.unwrap();

        assert!(session.is_authenticated().await);
        assert_eq!(session.username().await.as_deref(), Some("alice"));
        assert!(session.is_admin().await);
        assert!(session.is_client().await);
    }

    #[tokio::test]
    async fn fresh_token_is_returned_without_refresh() {
        let provider = MockProvider::new(token_expiring_in(3600, &[]), Err("unused".into()));
        let session = AuthSession::new(provider.clone(), None);
        session.login("alice", "secret").await.unwrap();

        assert!(session.bearer_token().await.is_some());
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn near_expiry_triggers_one_refresh() {
        let fresh = token_expiring_in(3600, &["CLIENT"]);
        let expected = fresh.access_token.clone();
        let provider = MockProvider::new(token_expiring_in(10, &["CLIENT"]), Ok(fresh));
        let session = AuthSession::new(provider.clone(), None);
        session.login("alice", "secret").await.unwrap();

        let token = session.bearer_token().await.unwrap();
        assert_eq!(token, expected);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);

        // Refreshed token is outside the window now; no second refresh
        assert!(session.bearer_token().await.is_some());
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_refresh_forces_logout() {
        let provider =
            MockProvider::new(token_expiring_in(5, &["CLIENT"]), Err("expired".into()));
        let session = AuthSession::new(provider, None);
        session.login("alice", "secret").await.unwrap();

        assert!(session.bearer_token().await.is_none());
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn persisted_session_is_restored() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let provider = MockProvider::new(token_expiring_in(3600, &["CLIENT"]), Err("no".into()));
        let session = AuthSession::new(provider, Some(path.clone()));
        session.login("alice", "secret").await.unwrap();
        assert!(path.exists());

        let provider2 = MockProvider::new(token_expiring_in(3600, &[]), Err("no".into()));
        let restored = AuthSession::new(provider2, Some(path.clone()));
        restored.init().await;
        assert!(restored.is_authenticated().await);
        assert_eq!(restored.username().await.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn expired_persisted_session_is_discarded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let provider = MockProvider::new(token_expiring_in(-60, &[]), Err("no".into()));
        let session = AuthSession::new(provider, Some(path.clone()));
        session.login("alice", "secret").await.unwrap();

        let provider2 = MockProvider::new(token_expiring_in(3600, &[]), Err("no".into()));
        let restored = AuthSession::new(provider2, Some(path.clone()));
        restored.init().await;
        assert!(!restored.is_authenticated().await);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn configured_session_file_is_where_the_session_lands() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let provider = MockProvider::new(token_expiring_in(3600, &[]), Err("no".into()));
        let session = crate::ClientConfig::new("http://localhost:8083")
            .with_session_file(path.clone())
            .build_auth_session(provider);

        session.login("alice", "secret").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn logout_clears_state_and_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let provider = MockProvider::new(token_expiring_in(3600, &[]), Err("no".into()));
        let session = AuthSession::new(provider, Some(path.clone()));
        session.login("alice", "secret").await.unwrap();

        session.logout().await;
        assert!(!session.is_authenticated().await);
        assert!(!path.exists());
    }
}
