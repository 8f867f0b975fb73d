//! Key/value backing-store abstraction shared by the cache and session layers

mod error;
mod store;

pub use error::{KvError, KvErrorKind};
pub use store::{KvStore, PROBE_KEY};
