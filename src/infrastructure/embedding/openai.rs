//! OpenAI-compatible embedding provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::embedding::{
    Embedding, EmbeddingInput, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse,
    EmbeddingUsage,
};
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Embedding provider speaking the OpenAI embeddings wire format
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    /// Create a new provider against the default OpenAI endpoint
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    /// Create a new provider with a custom base URL
    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, request: &EmbeddingRequest) -> serde_json::Value {
        let input = match request.input() {
            EmbeddingInput::Single(s) => serde_json::json!(s),
            EmbeddingInput::Batch(v) => serde_json::json!(v),
        };

        serde_json::json!({
            "model": request.model(),
            "input": input,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<EmbeddingResponse, DomainError> {
        let response: WireEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        let embeddings: Vec<Embedding> = response
            .data
            .into_iter()
            .map(|d| Embedding::new(d.index, d.embedding))
            .collect();

        let usage = EmbeddingUsage::new(response.usage.prompt_tokens, response.usage.total_tokens);

        Ok(EmbeddingResponse::new(response.model, embeddings, usage))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let url = self.embeddings_url();
        let body = self.build_request(&request);

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// Wire types: `{model, data: [{index, embedding}], usage}`

#[derive(Debug, Serialize, Deserialize)]
struct WireEmbeddingResponse {
    model: String,
    data: Vec<WireEmbeddingData>,
    usage: WireEmbeddingUsage,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireEmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/embeddings";

    fn mock_response(count: usize, dimensions: usize) -> serde_json::Value {
        let data: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                let embedding: Vec<f32> = (0..dimensions).map(|j| (i + j) as f32 * 0.001).collect();
                serde_json::json!({
                    "index": i,
                    "embedding": embedding,
                    "object": "embedding"
                })
            })
            .collect();

        serde_json::json!({
            "model": "text-embedding-3-small",
            "data": data,
            "usage": { "prompt_tokens": 12, "total_tokens": 12 }
        })
    }

    #[tokio::test]
    async fn test_embed_single() {
        let client = MockHttpClient::new().with_response(TEST_URL, mock_response(1, 8));
        let provider = OpenAiEmbeddingProvider::new(client, "sk-test");

        let response = provider
            .embed(EmbeddingRequest::single("text-embedding-3-small", "hello"))
            .await
            .unwrap();

        assert_eq!(response.embeddings().len(), 1);
        assert_eq!(response.first().unwrap().dimensions(), 8);
        assert_eq!(response.usage().total_tokens(), 12);
    }

    #[tokio::test]
    async fn test_embed_batch() {
        let client = MockHttpClient::new().with_response(TEST_URL, mock_response(3, 4));
        let provider = OpenAiEmbeddingProvider::new(client, "sk-test");

        let response = provider
            .embed(EmbeddingRequest::batch(
                "text-embedding-3-small",
                vec!["a".into(), "b".into(), "c".into()],
            ))
            .await
            .unwrap();

        assert_eq!(response.embeddings().len(), 3);
        assert_eq!(response.embeddings()[2].index(), 2);
    }

    #[tokio::test]
    async fn test_http_error_propagates() {
        let client = MockHttpClient::new().with_error(TEST_URL, "HTTP 401: invalid api key");
        let provider = OpenAiEmbeddingProvider::new(client, "sk-bad");

        let result = provider
            .embed(EmbeddingRequest::single("text-embedding-3-small", "x"))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_malformed_response_is_an_error() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, serde_json::json!({"unexpected": true}));
        let provider = OpenAiEmbeddingProvider::new(client, "sk-test");

        let result = provider
            .embed(EmbeddingRequest::single("text-embedding-3-small", "x"))
            .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_custom_base_url_is_trimmed() {
        let provider = OpenAiEmbeddingProvider::with_base_url(
            MockHttpClient::new(),
            "sk-test",
            "https://proxy.internal/",
        );

        assert_eq!(provider.embeddings_url(), "https://proxy.internal/v1/embeddings");
    }
}
