//! Session log domain models

mod message;

pub use message::{Role, SessionMessage};

use std::time::Duration;

/// A session log never holds more than this many messages after an append.
pub const MAX_LOG_MESSAGES: usize = 50;

/// Session logs expire this long after the most recent append.
pub const LOG_TTL: Duration = Duration::from_secs(24 * 60 * 60);
