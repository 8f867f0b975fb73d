//! Key/value store backends and the resilient lazy handle

mod in_memory;
mod lazy;
mod redis;

pub use in_memory::{FailureMode, InMemoryKv};
pub use lazy::LazyKvHandle;
pub use redis::RedisKv;
