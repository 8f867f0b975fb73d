//! Corpus chunk entities and per-query search results

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article-level metadata attached to each chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub title: String,
    pub source: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    /// Position of this chunk within its source article
    pub chunk_index: usize,
}

/// A bounded slice of source text plus metadata; the unit indexed for
/// retrieval. Immutable once loaded from the persisted corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// A scored chunk for one query
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: Arc<Chunk>,
    /// Cosine similarity against the query embedding, in [-1, 1]
    pub similarity: f32,
    /// Blended ranking signal, clamped to [0, 1]
    pub relevance: f32,
}

/// Outcome of a corpus load: how many records deserialized, how many were
/// skipped as malformed. Skipped records are logged individually.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusLoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

impl CorpusLoadReport {
    pub fn total(&self) -> usize {
        self.loaded + self.skipped
    }
}
