//! newsrag-core
//!
//! Retrieval core for a news RAG assistant:
//! - Embedding generation with a deterministic fallback that never fails
//! - Brute-force vector search with blended relevance ranking and
//!   grouped-by-article context assembly
//! - A degrade-never-crash response cache over a key/value backing store
//! - Append/trim/expire per-session conversation logs
//!
//! The chat surface, prompt construction, generative-model calls and corpus
//! ingestion are external collaborators; this crate assumes they invoke it
//! from a concurrent request-handling context and promises that no failure
//! here ever surfaces as a hard error.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::embedding::EmbeddingProvider;
use infrastructure::cache::ResponseCache;
use infrastructure::embedding::{EmbeddingService, OpenAiEmbeddingProvider};
use infrastructure::http_client::HttpClient;
use infrastructure::kv::LazyKvHandle;
use infrastructure::retrieval::VectorStore;
use infrastructure::session::SessionStore;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Composition root owning the retrieval components and the shared lazy
/// key/value handles. The orchestrator holds one of these per process and
/// calls into its components from arbitrary request tasks.
#[derive(Debug)]
pub struct RagCore {
    pub embeddings: Arc<EmbeddingService>,
    pub vector_store: Arc<VectorStore>,
    pub cache: Arc<ResponseCache>,
    pub sessions: Arc<SessionStore>,
}

impl RagCore {
    pub fn new(config: &AppConfig) -> Self {
        let provider: Option<Arc<dyn EmbeddingProvider>> =
            config.embedding.api_key.as_ref().map(|api_key| {
                let http = HttpClient::with_timeout(PROVIDER_TIMEOUT);
                let provider: Arc<dyn EmbeddingProvider> = match &config.embedding.base_url {
                    Some(base_url) => Arc::new(OpenAiEmbeddingProvider::with_base_url(
                        http,
                        api_key.as_str(),
                        base_url.as_str(),
                    )),
                    None => Arc::new(OpenAiEmbeddingProvider::new(http, api_key.as_str())),
                };
                provider
            });

        let embeddings = Arc::new(EmbeddingService::new(provider, config.embedding.model.clone()));

        let timeout = Duration::from_secs(config.kv.connection_timeout_secs);
        let write = Arc::new(LazyKvHandle::redis("kv-write", config.kv.url.clone(), timeout));
        let read_url = config.kv.read_url.clone().or_else(|| config.kv.url.clone());
        let read = Arc::new(LazyKvHandle::redis("kv-read", read_url, timeout));

        Self {
            vector_store: Arc::new(VectorStore::new(
                config.corpus.path.clone(),
                embeddings.clone(),
            )),
            cache: Arc::new(ResponseCache::new(write.clone(), read.clone())),
            sessions: Arc::new(SessionStore::new(write, read)),
            embeddings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::FALLBACK_DIMENSION;

    #[tokio::test]
    async fn test_core_with_default_config_degrades_everywhere() {
        // No kv URL, no provider key, no corpus file: every layer runs in
        // its documented degraded mode without erroring.
        let core = RagCore::new(&AppConfig::default());

        let vector = core.embeddings.embed("query").await;
        assert_eq!(vector.len(), FALLBACK_DIMENSION);

        assert!(core.vector_store.search("query", 5).await.is_empty());
        assert!(core.cache.get("query").await.is_none());

        let message = crate::domain::session::SessionMessage::user("s", "hi");
        core.sessions.append(&message).await;
        assert!(core.sessions.read("s").await.is_empty());
        core.sessions.clear("s").await;
    }
}
