//! Query cache and retry policy
//!
//! The data-fetching layer between the pages and the API client. Results
//! are cached by key; a mutation invalidates the affected prefix and the
//! next read fetches authoritative state again. The client itself never
//! retries - this layer retries transient failures and skips anything that
//! signals a 4xx.

use crate::{ApiError, ApiResult};
use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::CommandStatus;

/// Retries after the first failure, for non-4xx errors
const MAX_RETRIES: u32 = 2;

/// Cache key, one per distinct query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn products() -> Self {
        Self("products".into())
    }

    pub fn product(product_id: u64) -> Self {
        Self(format!("products/{product_id}"))
    }

    pub fn commands(status: Option<CommandStatus>) -> Self {
        match status {
            Some(status) => Self(format!("commands?status={status}")),
            None => Self("commands".into()),
        }
    }

    pub fn command(command_id: u64) -> Self {
        Self(format!("commands/{command_id}"))
    }

    pub fn users() -> Self {
        Self("users".into())
    }

    pub fn user(user_id: &str) -> Self {
        Self(format!("users/{user_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Keyed cache of fetched values
#[derive(Debug, Default)]
pub struct QueryClient {
    cache: DashMap<QueryKey, serde_json::Value>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or run `fetcher` under the retry
    /// policy and cache its result.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> ApiResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        if let Some(cached) = self.cache.get(&key) {
            return serde_json::from_value(cached.clone()).map_err(ApiError::from);
        }
        self.refetch(key, fetcher).await
    }

    /// Fetch bypassing the cache (the manual retry affordance)
    pub async fn refetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> ApiResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let value = self.run_with_retry(&key, fetcher).await?;
        self.cache.insert(key, serde_json::to_value(&value)?);
        Ok(value)
    }

    async fn run_with_retry<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> ApiResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match fetcher().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_client_error() || attempt >= MAX_RETRIES => return Err(e),
                Err(e) => {
                    attempt += 1;
                    tracing::warn!(
                        key = key.as_str(),
                        attempt,
                        "Query failed, retrying: {}",
                        e
                    );
                }
            }
        }
    }

    /// Drop every cached entry whose key starts with `prefix`
    ///
    /// Mutations call this with the resource prefix ("products",
    /// "commands", "users") so list and detail queries re-fetch together.
    pub fn invalidate(&self, prefix: &str) {
        self.cache.retain(|key, _| !key.as_str().starts_with(prefix));
    }

    /// Drop everything (used on logout)
    pub fn clear(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> ApiError {
        ApiError::Unreachable("connection refused".into())
    }

    #[tokio::test]
    async fn second_fetch_hits_the_cache() {
        let client = QueryClient::new();
        let calls = AtomicU32::new(0);
        let fetcher = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42u32) }
        };

        assert_eq!(client.fetch(QueryKey::products(), fetcher).await.unwrap(), 42);
        assert_eq!(client.fetch(QueryKey::products(), fetcher).await.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_forces_a_refetch() {
        let client = QueryClient::new();
        let calls = AtomicU32::new(0);
        let fetcher = || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n) }
        };

        assert_eq!(client.fetch(QueryKey::products(), fetcher).await.unwrap(), 0);
        client.invalidate("products");
        assert_eq!(client.fetch(QueryKey::products(), fetcher).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn prefix_invalidation_covers_filtered_and_detail_keys() {
        let client = QueryClient::new();
        let calls = AtomicU32::new(0);
        let fetcher = || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n) }
        };

        let filtered = QueryKey::commands(Some(CommandStatus::Pending));
        let detail = QueryKey::command(7);
        client.fetch(filtered.clone(), fetcher).await.unwrap();
        client.fetch(detail.clone(), fetcher).await.unwrap();
        client.fetch(QueryKey::users(), fetcher).await.unwrap();

        client.invalidate("commands");

        client.fetch(filtered, fetcher).await.unwrap();
        client.fetch(detail, fetcher).await.unwrap();
        client.fetch(QueryKey::users(), fetcher).await.unwrap();
        // users stayed cached; both command keys re-fetched
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn transient_errors_retry_up_to_twice() {
        let client = QueryClient::new();
        let calls = AtomicU32::new(0);
        let fetcher = || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err(transient()) } else { Ok(99u32) } }
        };

        assert_eq!(client.fetch(QueryKey::products(), fetcher).await.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retries_are_exhausted_after_two() {
        let client = QueryClient::new();
        let calls = AtomicU32::new(0);
        let fetcher = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<u32, _>(transient()) }
        };

        assert!(client.fetch(QueryKey::products(), fetcher).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_errors_are_never_retried() {
        let client = QueryClient::new();
        let calls = AtomicU32::new(0);
        let fetcher = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<u32, _>(ApiError::Unauthorized) }
        };

        let err = client
            .fetch(QueryKey::products(), fetcher)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
