//! Embedding client abstraction and its HTTP backend.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::get_config;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Transport-level failure while contacting the provider.
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("embedding service returned {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status reported by the provider.
        status: StatusCode,
        /// Response body captured for diagnostics.
        body: String,
    },
    /// Provider returned a different number of vectors than inputs.
    #[error("embedding count mismatch: sent {sent} texts, received {received} vectors")]
    CountMismatch {
        /// Number of texts in the request batch.
        sent: usize,
        /// Number of vectors in the response.
        received: usize,
    },
    /// Provider returned no vectors at all.
    #[error("embedding service returned no vectors")]
    Empty,
}

/// Interface implemented by embedding backends.
///
/// One batch call covers both ingestion (all chunks at once) and queries (a single-item
/// batch), so every backend only has to implement this method.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text, in order.
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// HTTP embedding client speaking the Ollama `/api/embed` protocol.
///
/// No client-side timeout is configured beyond reqwest defaults; deployments that need
/// bounded latency should front the provider with one.
pub struct OllamaEmbeddingClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbeddingClient {
    /// Construct a client from the process-wide configuration.
    pub fn new() -> Self {
        let config = get_config();
        Self::from_parts(&config.embedding_url, &config.embedding_model)
    }

    /// Construct a client against an explicit endpoint and model.
    pub fn from_parts(base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

impl Default for OllamaEmbeddingClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Err(EmbeddingClientError::Empty);
        }

        let sent = texts.len();
        tracing::debug!(model = %self.model, batch = sent, "Requesting embeddings");

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&json!({
                "model": self.model,
                "input": texts,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingClientError::UnexpectedStatus { status, body });
        }

        let payload: EmbedResponse = response.json().await?;
        if payload.embeddings.is_empty() {
            return Err(EmbeddingClientError::Empty);
        }
        if payload.embeddings.len() != sent {
            return Err(EmbeddingClientError::CountMismatch {
                sent,
                received: payload.embeddings.len(),
            });
        }

        Ok(payload.embeddings)
    }
}
