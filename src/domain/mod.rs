//! Domain models, traits and pure logic for the retrieval core

pub mod embedding;
pub mod kv;
pub mod retrieval;
pub mod session;

mod error;

pub use error::DomainError;
