//! Retrieval domain: corpus chunks, relevance scoring and context assembly

mod chunk;
mod context;
mod scoring;

pub use chunk::{Chunk, ChunkMetadata, CorpusLoadReport, SearchResult};
pub use context::{GROUP_DELIMITER, RetrievedContext};
pub use scoring::{recency_score, relevance_score, title_overlap};
