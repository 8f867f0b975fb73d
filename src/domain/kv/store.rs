//! Key/value store trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use super::KvError;

/// Key written by the liveness probe; short TTL so probes never accumulate.
pub const PROBE_KEY: &str = "newsrag:probe";

/// Key/value + ordered-list operations against the backing store.
///
/// Scalar operations back the response cache; the list operations back the
/// per-session message logs. All calls are potentially blocking network
/// operations; callers above this trait convert failures into their
/// documented degraded results.
#[async_trait]
pub trait KvStore: Send + Sync + Debug {
    /// GET; absence is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// SET with expiry.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError>;

    /// DELETE. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), KvError>;

    /// List RANGE with redis index semantics (negative indices count from
    /// the tail; `0, -1` is the whole list).
    async fn list_range(&self, key: &str, start: isize, stop: isize)
    -> Result<Vec<String>, KvError>;

    /// Appends `value` to the list at `key`, refreshes the list's TTL and
    /// trims it to the newest `max_len` entries, issued as one pipeline so
    /// interleaved appends cannot lose the trim.
    async fn push_capped(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        max_len: usize,
    ) -> Result<(), KvError>;

    /// Liveness probe: one test write under [`PROBE_KEY`].
    async fn probe(&self) -> Result<(), KvError>;
}
