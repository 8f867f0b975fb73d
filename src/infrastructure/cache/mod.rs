//! Resilient caching layer

pub mod keys;

mod service;

pub use service::ResponseCache;
