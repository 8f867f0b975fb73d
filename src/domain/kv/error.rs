//! Typed classification of backing-store failures
//!
//! The client wrapper maps backend status/error codes into this closed set;
//! the cache and session layers branch on the kind instead of matching on
//! error text.

use std::fmt;

use thiserror::Error;

/// Closed set of backing-store failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvErrorKind {
    /// Credentials rejected by the backing store. Permanently disables the
    /// client handle that observed it.
    AuthRejected,
    /// Network failure, timeout or server unavailability. Transient; each
    /// operation degrades independently.
    Unavailable,
    /// Unexpected response shape or value type.
    Protocol,
}

impl fmt::Display for KvErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvErrorKind::AuthRejected => write!(f, "auth rejected"),
            KvErrorKind::Unavailable => write!(f, "unavailable"),
            KvErrorKind::Protocol => write!(f, "protocol"),
        }
    }
}

/// A classified backing-store error
#[derive(Debug, Clone, Error)]
#[error("kv error ({kind}): {message}")]
pub struct KvError {
    kind: KvErrorKind,
    message: String,
}

impl KvError {
    pub fn new(kind: KvErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn auth_rejected(message: impl Into<String>) -> Self {
        Self::new(KvErrorKind::AuthRejected, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(KvErrorKind::Unavailable, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(KvErrorKind::Protocol, message)
    }

    pub fn kind(&self) -> KvErrorKind {
        self.kind
    }

    pub fn is_auth_rejected(&self) -> bool {
        self.kind == KvErrorKind::AuthRejected
    }
}
