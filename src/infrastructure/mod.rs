//! Infrastructure: provider, store and backend implementations

pub mod cache;
pub mod embedding;
pub mod http_client;
pub mod kv;
pub mod logging;
pub mod retrieval;
pub mod session;
