//! Retrieval infrastructure

mod store;

pub use store::VectorStore;
