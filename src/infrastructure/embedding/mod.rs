//! Embedding infrastructure: provider implementations and the fallback facade

mod openai;
mod service;

pub use openai::OpenAiEmbeddingProvider;
pub use service::EmbeddingService;
