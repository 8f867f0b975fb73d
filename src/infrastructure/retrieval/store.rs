//! Vector store: one-time corpus load, brute-force search, context assembly
//!
//! The corpus is small, so every query scans all chunks; no index is built.
//! Loading is lazy and happens at most once per process. A missing corpus
//! file yields an empty corpus, and malformed records are skipped one by one
//! rather than aborting the load.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::domain::embedding::cosine_similarity;
use crate::domain::retrieval::{
    Chunk, CorpusLoadReport, RetrievedContext, SearchResult, relevance_score,
};
use crate::infrastructure::embedding::EmbeddingService;

/// Results at or below this similarity are dropped before ranking cutoff
const SIMILARITY_FLOOR: f32 = 0.1;

type Corpus = (Vec<Arc<Chunk>>, CorpusLoadReport);

/// In-memory corpus with similarity search and context assembly
#[derive(Debug)]
pub struct VectorStore {
    corpus_path: PathBuf,
    embeddings: Arc<EmbeddingService>,
    corpus: OnceCell<Corpus>,
}

impl VectorStore {
    pub fn new(corpus_path: impl Into<PathBuf>, embeddings: Arc<EmbeddingService>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            embeddings,
            corpus: OnceCell::new(),
        }
    }

    /// Store over an already-materialized corpus; no file is read.
    pub fn with_chunks(chunks: Vec<Chunk>, embeddings: Arc<EmbeddingService>) -> Self {
        let loaded = chunks.len();
        let corpus: Corpus = (
            chunks.into_iter().map(Arc::new).collect(),
            CorpusLoadReport { loaded, skipped: 0 },
        );

        Self {
            corpus_path: PathBuf::new(),
            embeddings,
            corpus: OnceCell::new_with(Some(corpus)),
        }
    }

    /// Forces the one-time corpus load and returns its report.
    pub async fn load(&self) -> CorpusLoadReport {
        self.corpus().await.1
    }

    async fn corpus(&self) -> &Corpus {
        self.corpus
            .get_or_init(|| load_corpus(self.corpus_path.clone()))
            .await
    }

    /// Embeds the query, scores every chunk, and returns at most `k` results
    /// with similarity above the floor, ordered by descending relevance.
    /// An empty corpus or an unmatched query yields an empty vector.
    pub async fn search(&self, query: &str, k: usize) -> Vec<SearchResult> {
        let (chunks, _) = self.corpus().await;
        if chunks.is_empty() || k == 0 {
            return Vec::new();
        }

        let query_embedding = self.embeddings.embed(query).await;
        let now = Utc::now();

        let mut results: Vec<SearchResult> = chunks
            .iter()
            .map(|chunk| {
                let similarity = cosine_similarity(&query_embedding, &chunk.embedding);
                let relevance = relevance_score(query, &chunk.metadata, similarity, now);
                SearchResult {
                    chunk: chunk.clone(),
                    similarity,
                    relevance,
                }
            })
            .collect();

        // sort_by is stable; equal relevance keeps corpus order.
        results.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(Ordering::Equal)
        });
        results.retain(|r| r.similarity > SIMILARITY_FLOOR);
        results.truncate(k);

        results
    }

    /// Runs `search` and assembles the grouped context block, source list
    /// and summary.
    pub async fn build_context(&self, query: &str, k: usize) -> RetrievedContext {
        let results = self.search(query, k).await;

        RetrievedContext::assemble(&results)
    }
}

async fn load_corpus(path: PathBuf) -> Corpus {
    let empty: Corpus = (Vec::new(), CorpusLoadReport::default());

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no corpus file, starting with an empty corpus");
            return empty;
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to read corpus file");
            return empty;
        }
    };

    let records: Vec<serde_json::Value> = match serde_json::from_slice(&bytes) {
        Ok(records) => records,
        Err(error) => {
            warn!(path = %path.display(), %error, "corpus file is not a JSON array");
            return empty;
        }
    };

    let total = records.len();
    let mut chunks = Vec::with_capacity(total);
    let mut skipped = 0usize;

    for record in records {
        match serde_json::from_value::<Chunk>(record) {
            Ok(chunk) => chunks.push(Arc::new(chunk)),
            Err(error) => {
                skipped += 1;
                warn!(%error, "skipping malformed corpus record");
            }
        }
    }

    let report = CorpusLoadReport {
        loaded: chunks.len(),
        skipped,
    };
    info!(
        loaded = report.loaded,
        total, "corpus loaded; skipped records are logged above"
    );

    (chunks, report)
}
