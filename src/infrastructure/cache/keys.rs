//! Deterministic cache key derivation
//!
//! Keys are namespaced by purpose and derived from raw semantic inputs. No
//! normalization is applied: queries differing only in case or whitespace
//! produce distinct keys. This mirrors observed production behavior and is
//! kept deliberately; see DESIGN.md before changing it.

use sha2::{Digest, Sha256};

const RESPONSE_NAMESPACE: &str = "newsrag:response";

/// Hex sha256 digest of the raw input text
pub fn digest(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Cache key for a query's assembled answer
pub fn response_key(raw_query: &str) -> String {
    format!("{}:{}", RESPONSE_NAMESPACE, digest(raw_query))
}
