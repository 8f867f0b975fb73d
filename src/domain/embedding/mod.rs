//! Embedding domain models and traits

mod fallback;
mod provider;
mod request;
mod response;

pub use fallback::{FALLBACK_DIMENSION, fallback_embedding};
pub use provider::EmbeddingProvider;
pub use request::{EmbeddingInput, EmbeddingRequest};
pub use response::{Embedding, EmbeddingResponse, EmbeddingUsage, cosine_similarity};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
