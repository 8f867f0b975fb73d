//! Deterministic fallback embeddings
//!
//! Used whenever no external embedding provider is configured or a provider
//! call fails. The vectors carry only weak lexical signal, but they are
//! stable for identical text, so retrieval stays deterministic in degraded
//! mode instead of erroring.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Dimension of fallback vectors. A real provider may return a different
/// dimension; cosine similarity across mismatched dimensions is 0.
pub const FALLBACK_DIMENSION: usize = 768;

/// Width of each global feature block. The text-length feature occupies the
/// first block, the character-diversity feature the second.
const FEATURE_BLOCK: usize = 50;

fn hash_token(token: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    hasher.finish()
}

/// Computes a deterministic pseudo-embedding for `text`.
///
/// Tokenizes on whitespace; each token's hash scatters a small sinusoidal
/// contribution across the vector, then two global feature blocks encode
/// normalized text length and character diversity. The result is
/// L2-normalized; an all-zero vector (empty text) is returned unchanged.
pub fn fallback_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; FALLBACK_DIMENSION];

    for (token_index, token) in text.split_whitespace().enumerate() {
        let hash = hash_token(token);
        for i in 0..FALLBACK_DIMENSION {
            let position = (hash as usize)
                .wrapping_add(i)
                .wrapping_add(token_index)
                % FALLBACK_DIMENSION;
            vector[position] += ((hash.wrapping_add(i as u64)) as f64).sin() as f32 * 0.1;
        }
    }

    let length_feature = (text.len() as f32 / 1000.0).min(1.0);
    let char_count = text.chars().count();
    let diversity = if char_count == 0 {
        0.0
    } else {
        let unique: HashSet<char> = text.chars().collect();
        unique.len() as f32 / char_count as f32
    };

    for slot in vector.iter_mut().take(FEATURE_BLOCK) {
        *slot += length_feature;
    }
    for slot in vector.iter_mut().skip(FEATURE_BLOCK).take(FEATURE_BLOCK) {
        *slot += diversity;
    }

    let magnitude: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }

    vector
}
