//! Best-effort response cache
//!
//! `get` and `set` never fail: a disabled or unreachable backing store makes
//! them no-ops, and an auth rejection permanently disables the handle that
//! observed it. Availability wins over cache-hit quality.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::keys;
use crate::infrastructure::kv::LazyKvHandle;

/// Key/value wrapper with TTL over the lazy write and read-replica handles
#[derive(Debug)]
pub struct ResponseCache {
    write: Arc<LazyKvHandle>,
    read: Arc<LazyKvHandle>,
}

impl ResponseCache {
    pub fn new(write: Arc<LazyKvHandle>, read: Arc<LazyKvHandle>) -> Self {
        Self { write, read }
    }

    /// Best-effort lookup by raw query text. Absence, a disabled handle and
    /// a failed read all yield `None`.
    pub async fn get(&self, raw_query: &str) -> Option<serde_json::Value> {
        let store = self.read.client().await?;

        match store.get(&keys::response_key(raw_query)).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => Some(value),
                Err(error) => {
                    debug!(%error, "discarding unparsable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                self.read.observe_error(&error);
                None
            }
        }
    }

    /// Best-effort store with TTL. Failures are classified and swallowed.
    pub async fn set(&self, raw_query: &str, value: &serde_json::Value, ttl: Duration) {
        let Some(store) = self.write.client().await else {
            return;
        };

        if let Err(error) = store
            .set_ex(&keys::response_key(raw_query), &value.to_string(), ttl)
            .await
        {
            self.write.observe_error(&error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kv::KvStore;
    use crate::infrastructure::kv::{FailureMode, InMemoryKv};

    fn cache_over(store: Arc<InMemoryKv>) -> ResponseCache {
        ResponseCache::new(
            Arc::new(LazyKvHandle::with_store("kv-write", store.clone())),
            Arc::new(LazyKvHandle::with_store("kv-read", store)),
        )
    }

    #[tokio::test]
    async fn test_set_then_get_roundtrip() {
        let cache = cache_over(Arc::new(InMemoryKv::new()));
        let value = serde_json::json!({"answer": "cached", "sources": []});

        cache.set("what is new?", &value, Duration::from_secs(300)).await;

        assert_eq!(cache.get("what is new?").await, Some(value));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let cache = cache_over(Arc::new(InMemoryKv::new()));
        let value = serde_json::json!("short lived");

        cache.set("query", &value, Duration::ZERO).await;

        assert_eq!(cache.get("query").await, None);
    }

    #[tokio::test]
    async fn test_miss_is_none() {
        let cache = cache_over(Arc::new(InMemoryKv::new()));

        assert_eq!(cache.get("never stored").await, None);
    }

    #[tokio::test]
    async fn test_unreachable_store_degrades_silently() {
        let cache = cache_over(Arc::new(InMemoryKv::with_failure(FailureMode::Unavailable)));

        // The failed probe disables both handles; neither call raises.
        cache
            .set("q", &serde_json::json!(1), Duration::from_secs(30))
            .await;
        assert_eq!(cache.get("q").await, None);
    }

    #[tokio::test]
    async fn test_auth_rejection_disables_after_probe() {
        let store = Arc::new(InMemoryKv::new());
        let write = Arc::new(LazyKvHandle::with_store("kv-write", store.clone()));
        let read = Arc::new(LazyKvHandle::with_store("kv-read", store.clone()));
        let cache = ResponseCache::new(write.clone(), read.clone());

        // Healthy at probe time, credentials revoked afterwards.
        cache
            .set("q", &serde_json::json!(1), Duration::from_secs(30))
            .await;
        store.set_failure(FailureMode::AuthRejected);

        assert_eq!(cache.get("q").await, None);
        assert!(read.is_disabled());

        // Subsequent reads short-circuit without touching the store.
        let calls = store.call_count();
        assert_eq!(cache.get("q").await, None);
        assert_eq!(store.call_count(), calls);
    }

    #[tokio::test]
    async fn test_unconfigured_cache_is_a_noop() {
        let cache = ResponseCache::new(
            Arc::new(LazyKvHandle::redis("kv-write", None, Duration::from_secs(1))),
            Arc::new(LazyKvHandle::redis("kv-read", None, Duration::from_secs(1))),
        );

        cache
            .set("q", &serde_json::json!("v"), Duration::from_secs(30))
            .await;
        assert_eq!(cache.get("q").await, None);
    }

    #[tokio::test]
    async fn test_unparsable_entry_is_treated_as_miss() {
        let store = Arc::new(InMemoryKv::new());
        store
            .set_ex(&keys::response_key("q"), "{not json", Duration::from_secs(60))
            .await
            .unwrap();

        let cache = cache_over(store);

        assert_eq!(cache.get("q").await, None);
    }
}
