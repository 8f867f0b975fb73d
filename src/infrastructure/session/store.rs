//! Per-session conversation log over the key/value backing store
//!
//! Appends are best-effort: the push, TTL refresh and trim travel as one
//! pipeline so interleaved appends cannot lose the trim. Reads skip
//! unparsable entries. `clear` always reports success; the contract is
//! "no longer guaranteed to exist", not "delete confirmed".

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::session::{LOG_TTL, MAX_LOG_MESSAGES, SessionMessage};
use crate::infrastructure::kv::LazyKvHandle;

const SESSION_NAMESPACE: &str = "newsrag:session";

fn session_key(session_id: &str) -> String {
    format!("{}:{}", SESSION_NAMESPACE, session_id)
}

/// Append-only, length-capped, TTL-refreshed session log
#[derive(Debug)]
pub struct SessionStore {
    write: Arc<LazyKvHandle>,
    read: Arc<LazyKvHandle>,
}

impl SessionStore {
    pub fn new(write: Arc<LazyKvHandle>, read: Arc<LazyKvHandle>) -> Self {
        Self { write, read }
    }

    /// Pushes a message onto the session's log, refreshes the log's TTL to
    /// 24 hours and trims it to the newest 50 entries. Any failure is logged
    /// and swallowed.
    pub async fn append(&self, message: &SessionMessage) {
        let Some(store) = self.write.client().await else {
            return;
        };

        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, "failed to serialize session message");
                return;
            }
        };

        if let Err(error) = store
            .push_capped(
                &session_key(&message.session_id),
                &payload,
                LOG_TTL,
                MAX_LOG_MESSAGES,
            )
            .await
        {
            self.write.observe_error(&error);
        }
    }

    /// Returns the session's log oldest-first. Unparsable entries are
    /// skipped individually; an unavailable store yields an empty log.
    pub async fn read(&self, session_id: &str) -> Vec<SessionMessage> {
        let Some(store) = self.read.client().await else {
            return Vec::new();
        };

        let raw = match store.list_range(&session_key(session_id), 0, -1).await {
            Ok(raw) => raw,
            Err(error) => {
                self.read.observe_error(&error);
                return Vec::new();
            }
        };

        let total = raw.len();
        let messages: Vec<SessionMessage> = raw
            .iter()
            .filter_map(|entry| match serde_json::from_str(entry) {
                Ok(message) => Some(message),
                Err(error) => {
                    debug!(%error, "skipping unparsable session entry");
                    None
                }
            })
            .collect();

        if messages.len() < total {
            warn!(
                session_id,
                parsed = messages.len(),
                total,
                "skipped unparsable session entries"
            );
        }

        messages
    }

    /// Deletes the session's log. Always reports success to the caller,
    /// independent of whether the underlying delete succeeded.
    pub async fn clear(&self, session_id: &str) {
        let Some(store) = self.write.client().await else {
            return;
        };

        if let Err(error) = store.delete(&session_key(session_id)).await {
            self.write.observe_error(&error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kv::KvStore;
    use crate::domain::session::Role;
    use crate::infrastructure::kv::{FailureMode, InMemoryKv};

    fn store_over(kv: Arc<InMemoryKv>) -> SessionStore {
        SessionStore::new(
            Arc::new(LazyKvHandle::with_store("kv-write", kv.clone())),
            Arc::new(LazyKvHandle::with_store("kv-read", kv)),
        )
    }

    #[tokio::test]
    async fn test_append_then_read_in_order() {
        let sessions = store_over(Arc::new(InMemoryKv::new()));

        sessions
            .append(&SessionMessage::user("s1", "first question"))
            .await;
        sessions
            .append(&SessionMessage::assistant("s1", "first answer"))
            .await;

        let log = sessions.read("s1").await;

        assert_eq!(log.len(), 2);
        assert_eq!(log[0].role, Role::User);
        assert_eq!(log[1].content, "first answer");
    }

    #[tokio::test]
    async fn test_log_never_exceeds_cap() {
        let sessions = store_over(Arc::new(InMemoryKv::new()));

        for i in 0..60 {
            sessions
                .append(&SessionMessage::user("s1", format!("message {}", i)))
                .await;
        }

        let log = sessions.read("s1").await;

        assert_eq!(log.len(), MAX_LOG_MESSAGES);
        // Oldest entries were trimmed.
        assert_eq!(log[0].content, "message 10");
        assert_eq!(log.last().unwrap().content, "message 59");
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let sessions = store_over(Arc::new(InMemoryKv::new()));

        sessions.append(&SessionMessage::user("a", "for a")).await;
        sessions.append(&SessionMessage::user("b", "for b")).await;

        assert_eq!(sessions.read("a").await.len(), 1);
        assert_eq!(sessions.read("b").await.len(), 1);
        assert_eq!(sessions.read("a").await[0].content, "for a");
    }

    #[tokio::test]
    async fn test_unparsable_entries_are_skipped() {
        let kv = Arc::new(InMemoryKv::new());
        let sessions = store_over(kv.clone());

        sessions.append(&SessionMessage::user("s1", "good")).await;
        kv.push_capped(
            &session_key("s1"),
            "{broken json",
            LOG_TTL,
            MAX_LOG_MESSAGES,
        )
        .await
        .unwrap();
        sessions
            .append(&SessionMessage::assistant("s1", "also good"))
            .await;

        let log = sessions.read("s1").await;

        assert_eq!(log.len(), 2);
        assert_eq!(log[0].content, "good");
        assert_eq!(log[1].content, "also good");
    }

    #[tokio::test]
    async fn test_unreachable_store_degrades() {
        let sessions = store_over(Arc::new(InMemoryKv::with_failure(FailureMode::Unavailable)));

        // None of these raise; read reports an empty log.
        sessions.append(&SessionMessage::user("s1", "lost")).await;
        assert!(sessions.read("s1").await.is_empty());
        sessions.clear("s1").await;
    }

    #[tokio::test]
    async fn test_clear_removes_log_and_always_succeeds() {
        let kv = Arc::new(InMemoryKv::new());
        let sessions = store_over(kv.clone());

        sessions.append(&SessionMessage::user("s1", "hello")).await;
        sessions.clear("s1").await;
        assert!(sessions.read("s1").await.is_empty());

        // Clearing with a failing backend is still "success" by contract.
        kv.set_failure(FailureMode::Unavailable);
        sessions.clear("s1").await;
    }

    #[tokio::test]
    async fn test_append_after_auth_rejection_is_noop() {
        let kv = Arc::new(InMemoryKv::new());
        let write = Arc::new(LazyKvHandle::with_store("kv-write", kv.clone()));
        let read = Arc::new(LazyKvHandle::with_store("kv-read", kv.clone()));
        let sessions = SessionStore::new(write.clone(), read);

        sessions.append(&SessionMessage::user("s1", "ok")).await;
        kv.set_failure(FailureMode::AuthRejected);
        sessions.append(&SessionMessage::user("s1", "rejected")).await;

        assert!(write.is_disabled());

        // Later appends short-circuit without touching the store.
        let calls = kv.call_count();
        sessions.append(&SessionMessage::user("s1", "dropped")).await;
        assert_eq!(kv.call_count(), calls);
    }
}
