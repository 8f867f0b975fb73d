//! Blended relevance scoring
//!
//! `relevance = 0.7 * similarity + 0.2 * recency + 0.1 * title_overlap`,
//! clamped to [0, 1]. Similarity dominates; recency rewards fresh articles
//! and title overlap rewards lexical matches the embedding may miss.

use chrono::{DateTime, Utc};

use super::ChunkMetadata;

const SIMILARITY_WEIGHT: f32 = 0.7;
const RECENCY_WEIGHT: f32 = 0.2;
const TITLE_WEIGHT: f32 = 0.1;

/// Days after which an article's recency contribution reaches zero
const RECENCY_WINDOW_DAYS: f32 = 30.0;

/// Linear recency decay: 1.0 at publish time, 0.0 after 30 days.
pub fn recency_score(published_at: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
    let days = (now - published_at).num_seconds() as f32 / 86_400.0;
    (1.0 - days / RECENCY_WINDOW_DAYS).max(0.0)
}

/// Fraction of query terms that appear as substrings of some title term.
/// Both sides are lowercased and split on whitespace.
pub fn title_overlap(query: &str, title: &str) -> f32 {
    let query_lower = query.to_lowercase();
    let terms: Vec<&str> = query_lower.split_whitespace().collect();
    if terms.is_empty() {
        return 0.0;
    }

    let title_lower = title.to_lowercase();
    let title_terms: Vec<&str> = title_lower.split_whitespace().collect();

    let matched = terms
        .iter()
        .filter(|term| title_terms.iter().any(|tt| tt.contains(*term)))
        .count();

    matched as f32 / terms.len() as f32
}

/// Blended relevance for one chunk against one query, clamped to [0, 1].
pub fn relevance_score(
    query: &str,
    metadata: &ChunkMetadata,
    similarity: f32,
    now: DateTime<Utc>,
) -> f32 {
    let recency = recency_score(metadata.published_at, now);
    let overlap = title_overlap(query, &metadata.title);

    (SIMILARITY_WEIGHT * similarity + RECENCY_WEIGHT * recency + TITLE_WEIGHT * overlap)
        .clamp(0.0, 1.0)
}
