//! Generative model client abstraction and its HTTP backend.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::get_config;

/// Errors raised by generative model providers.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport-level failure while contacting the provider.
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("generation service returned {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status reported by the provider.
        status: StatusCode,
        /// Response body captured for diagnostics.
        body: String,
    },
    /// Provider responded without any usable candidate text.
    #[error("generation service returned no candidates")]
    EmptyResponse,
}

/// Interface implemented by generative model backends.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Produce natural-language text for the supplied prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// HTTP client for the Gemini `generateContent` API.
///
/// As with the embedding client, no request timeout is set here; the caller treats any
/// failure as a recoverable generation error.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Construct a client from the process-wide configuration.
    pub fn new() -> Self {
        let config = get_config();
        Self::from_parts(
            &config.generation_url,
            &config.generation_model,
            &config.generation_api_key,
        )
    }

    /// Construct a client against an explicit endpoint, model, and credential.
    pub fn from_parts(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Requesting generation");

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::UnexpectedStatus { status, body });
        }

        let payload: GenerateResponse = response.json().await?;
        let text: String = payload
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }
}
