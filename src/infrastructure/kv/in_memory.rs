//! In-memory key/value store with TTL semantics and failure injection
//!
//! Used by tests and as a development backend when no redis URL is
//! configured explicitly for one.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::kv::{KvError, KvStore};

/// Injectable failure behavior for every operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    None,
    /// Every call fails as if the store were unreachable
    Unavailable,
    /// Every call fails as if credentials were rejected
    AuthRejected,
}

#[derive(Debug, Clone)]
enum Value {
    Scalar(String),
    List(Vec<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// In-memory [`KvStore`]
#[derive(Debug)]
pub struct InMemoryKv {
    entries: Mutex<HashMap<String, Entry>>,
    failure: Mutex<FailureMode>,
    calls: AtomicUsize,
}

impl InMemoryKv {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            failure: Mutex::new(FailureMode::None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_failure(mode: FailureMode) -> Self {
        let store = Self::new();
        *store.failure.lock().unwrap() = mode;
        store
    }

    /// Switches the failure mode for subsequent operations.
    pub fn set_failure(&self, mode: FailureMode) {
        *self.failure.lock().unwrap() = mode;
    }

    /// Number of operations attempted against this store.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<(), KvError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match *self.failure.lock().unwrap() {
            FailureMode::None => Ok(()),
            FailureMode::Unavailable => Err(KvError::unavailable("injected: unreachable")),
            FailureMode::AuthRejected => Err(KvError::auth_rejected("injected: WRONGPASS")),
        }
    }

    fn expiry(ttl: Duration) -> Option<Instant> {
        Some(Instant::now() + ttl)
    }
}

impl Default for InMemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_index(index: isize, len: usize) -> isize {
    if index < 0 { len as isize + index } else { index }
}

#[async_trait]
impl KvStore for InMemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();

        match entries.get(key) {
            Some(entry) if entry.expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => match &entry.value {
                Value::Scalar(s) => Ok(Some(s.clone())),
                Value::List(_) => Err(KvError::protocol("WRONGTYPE: key holds a list")),
            },
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        self.check()?;
        self.entries.lock().unwrap().insert(
            key.to_string(),
            Entry {
                value: Value::Scalar(value.to_string()),
                expires_at: Self::expiry(ttl),
            },
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);

        Ok(())
    }

    async fn list_range(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, KvError> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();

        let entry = match entries.get(key) {
            Some(entry) if entry.expired() => {
                entries.remove(key);
                return Ok(Vec::new());
            }
            Some(entry) => entry,
            None => return Ok(Vec::new()),
        };

        let items = match &entry.value {
            Value::List(items) => items,
            Value::Scalar(_) => return Err(KvError::protocol("WRONGTYPE: key holds a scalar")),
        };

        let len = items.len();
        let start = resolve_index(start, len).max(0) as usize;
        let stop = resolve_index(stop, len).min(len as isize - 1);

        if stop < 0 || start as isize > stop {
            return Ok(Vec::new());
        }

        Ok(items[start..=stop as usize].to_vec())
    }

    async fn push_capped(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        max_len: usize,
    ) -> Result<(), KvError> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();

        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: Value::List(Vec::new()),
            expires_at: None,
        });

        if entry.expired() {
            entry.value = Value::List(Vec::new());
        }

        let items = match &mut entry.value {
            Value::List(items) => items,
            Value::Scalar(_) => return Err(KvError::protocol("WRONGTYPE: key holds a scalar")),
        };

        items.push(value.to_string());
        if items.len() > max_len {
            let excess = items.len() - max_len;
            items.drain(..excess);
        }
        entry.expires_at = Self::expiry(ttl);

        Ok(())
    }

    async fn probe(&self) -> Result<(), KvError> {
        self.check()?;
        Ok(())
    }
}
