//! Redis implementation of the key/value store

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::kv::{KvError, KvStore, PROBE_KEY};

/// Redis-backed key/value store over a pooled connection manager
#[derive(Clone)]
pub struct RedisKv {
    connection: ConnectionManager,
}

impl fmt::Debug for RedisKv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisKv")
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisKv {
    /// Connects to the given URL, bounded by `timeout`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, KvError> {
        let client = Client::open(url).map_err(classify)?;

        let connection = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| KvError::unavailable("connection attempt timed out"))?
            .map_err(classify)?;

        Ok(Self { connection })
    }
}

/// Maps redis errors into the closed [`KvErrorKind`] set.
fn classify(error: redis::RedisError) -> KvError {
    let auth_code = matches!(error.code(), Some("NOAUTH") | Some("WRONGPASS") | Some("NOPERM"));

    if error.kind() == redis::ErrorKind::AuthenticationFailed || auth_code {
        KvError::auth_rejected(error.to_string())
    } else if error.is_io_error() || error.is_timeout() || error.is_connection_refusal() {
        KvError::unavailable(error.to_string())
    } else {
        KvError::protocol(error.to_string())
    }
}

#[async_trait]
impl KvStore for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.connection.clone();

        conn.get(key).await.map_err(classify)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        let mut conn = self.connection.clone();
        let ttl_secs = ttl.as_secs().max(1);

        let _: () = conn.set_ex(key, value, ttl_secs).await.map_err(classify)?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        let mut conn = self.connection.clone();

        let _: i32 = conn.del(key).await.map_err(classify)?;

        Ok(())
    }

    async fn list_range(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, KvError> {
        let mut conn = self.connection.clone();

        conn.lrange(key, start, stop).await.map_err(classify)
    }

    async fn push_capped(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        max_len: usize,
    ) -> Result<(), KvError> {
        let mut conn = self.connection.clone();
        let ttl_secs = ttl.as_secs().max(1) as i64;

        // One pipeline so interleaved appends cannot lose the trim.
        redis::pipe()
            .rpush(key, value)
            .ignore()
            .expire(key, ttl_secs)
            .ignore()
            .ltrim(key, -(max_len as isize), -1)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(classify)?;

        Ok(())
    }

    async fn probe(&self) -> Result<(), KvError> {
        self.set_ex(PROBE_KEY, "1", Duration::from_secs(5)).await
    }
}
