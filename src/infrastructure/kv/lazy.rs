//! Lazily-initialized, permanently-disabling key/value client handle
//!
//! Each handle owns one client (write or read-replica) and a disabled flag.
//! Missing configuration or a failed liveness probe disables the handle for
//! the process lifetime; an auth rejection observed during operation does the
//! same. The disable transition is logged exactly once per handle.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::RedisKv;
use crate::domain::kv::{KvError, KvErrorKind, KvStore};

enum Connector {
    Redis { url: Option<String>, timeout: Duration },
    Preset(Arc<dyn KvStore>),
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connector::Redis { url, .. } => f
                .debug_struct("Redis")
                .field("configured", &url.is_some())
                .finish(),
            Connector::Preset(_) => f.debug_struct("Preset").finish(),
        }
    }
}

/// A lazy handle to the backing store that degrades into a permanent no-op
#[derive(Debug)]
pub struct LazyKvHandle {
    label: &'static str,
    connector: Connector,
    cell: OnceCell<Option<Arc<dyn KvStore>>>,
    disabled: AtomicBool,
    disable_logged: AtomicBool,
}

impl LazyKvHandle {
    /// Handle that connects to redis on first use. `None` URL means the
    /// handle is configured absent and disables itself when first touched.
    pub fn redis(label: &'static str, url: Option<String>, timeout: Duration) -> Self {
        Self {
            label,
            connector: Connector::Redis { url, timeout },
            cell: OnceCell::new(),
            disabled: AtomicBool::new(false),
            disable_logged: AtomicBool::new(false),
        }
    }

    /// Handle over an existing store, still subject to the probe and the
    /// disable rules. Used with the in-memory backend.
    pub fn with_store(label: &'static str, store: Arc<dyn KvStore>) -> Self {
        Self {
            label,
            connector: Connector::Preset(store),
            cell: OnceCell::new(),
            disabled: AtomicBool::new(false),
            disable_logged: AtomicBool::new(false),
        }
    }

    /// Returns the client, initializing it at most once. `None` when the
    /// handle is disabled.
    pub async fn client(&self) -> Option<Arc<dyn KvStore>> {
        if self.disabled.load(Ordering::Relaxed) {
            return None;
        }

        self.cell.get_or_init(|| self.initialize()).await.clone()
    }

    async fn initialize(&self) -> Option<Arc<dyn KvStore>> {
        let store: Arc<dyn KvStore> = match &self.connector {
            Connector::Preset(store) => store.clone(),
            Connector::Redis { url: None, .. } => {
                self.disable("no connection URL configured");
                return None;
            }
            Connector::Redis {
                url: Some(url),
                timeout,
            } => match RedisKv::connect(url, *timeout).await {
                Ok(kv) => Arc::new(kv),
                Err(error) => {
                    self.disable(&format!("connection failed: {error}"));
                    return None;
                }
            },
        };

        if let Err(error) = store.probe().await {
            self.disable(&format!("liveness probe failed: {error}"));
            return None;
        }

        Some(store)
    }

    /// Classifies an operation error: auth rejection disables the handle,
    /// anything else is logged at debug and tolerated.
    pub fn observe_error(&self, error: &KvError) {
        match error.kind() {
            KvErrorKind::AuthRejected => self.disable(&error.to_string()),
            _ => debug!(handle = self.label, %error, "key/value operation failed"),
        }
    }

    fn disable(&self, reason: &str) {
        self.disabled.store(true, Ordering::Relaxed);
        if !self.disable_logged.swap(true, Ordering::Relaxed) {
            warn!(
                handle = self.label,
                reason, "key/value client permanently disabled"
            );
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }
}
