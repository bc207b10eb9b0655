//! Service coordinating extraction, chunking, embedding, indexing, and answering.

use crate::{
    config::get_config,
    embedding::{EmbeddingClient, EmbeddingClientError, OllamaEmbeddingClient},
    extract::{ExtractError, ExtractorRegistry},
    generation::{GeminiClient, GenerativeClient},
    index::{FlatL2Index, IndexError, VectorIndex},
    metrics::{MetricsSnapshot, QaMetrics},
    processing::{
        chunking::chunk_paragraphs,
        prompt::{build_context, build_prompt},
    },
    store::{Document, DocumentSummary, SessionStore},
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Number of chunks retrieved per question.
const RETRIEVAL_TOP_K: usize = 3;

/// Answer returned when the requested document is not in the session registry.
///
/// A routine outcome under FIFO eviction, so it is phrased for the end user rather than
/// raised as an error.
pub const DOCUMENT_NOT_FOUND_MESSAGE: &str =
    "Document not found. It may have been cleared from the session. Please upload it again.";

/// Errors emitted by the ingestion pipeline. None of them leave partial state behind.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Filename extension is not registered with any extractor.
    #[error("unsupported file type for '{0}'")]
    UnsupportedType(String),
    /// The file was present but its contents could not be parsed.
    #[error("failed to extract document text: {0}")]
    Extraction(#[from] ExtractError),
    /// Extraction succeeded but chunking produced nothing.
    #[error("no text could be extracted from the document")]
    NoContent,
    /// Embedding provider failed to produce vectors for the chunks.
    #[error("failed to embed document chunks: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Chunk vectors did not fit the index dimensionality.
    #[error("failed to index document chunks: {0}")]
    Index(#[from] IndexError),
}

/// Errors emitted while answering a question.
///
/// Document-not-found and generation failures are reported inside the answer text and
/// never appear here.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// Embedding provider failed to embed the question.
    #[error("failed to embed question: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Question vector did not match the document index dimensionality.
    #[error("failed to search document index: {0}")]
    Index(#[from] IndexError),
}

/// Summary of a completed ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Identifier assigned to the stored document.
    pub document_id: Uuid,
    /// Original filename, echoed back to the uploader.
    pub file_name: String,
    /// Number of chunks indexed for the document.
    pub chunk_count: usize,
}

/// Abstraction over the Q&A pipeline used by external surfaces.
#[async_trait]
pub trait QaApi: Send + Sync {
    /// Extract, chunk, embed, and index a document into the session's registry.
    async fn ingest(
        &self,
        session_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<IngestOutcome, IngestError>;

    /// Answer a question about a stored document.
    async fn answer(
        &self,
        session_id: &str,
        document_id: Uuid,
        question: &str,
    ) -> Result<String, AnswerError>;

    /// Enumerate the session's documents in insertion order.
    async fn list_documents(&self, session_id: &str) -> Vec<DocumentSummary>;

    /// Remove the session and report how many documents it held.
    async fn clear_session(&self, session_id: &str) -> usize;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Coordinates the full pipeline: extraction, chunking, embedding, indexing, retrieval,
/// and answer generation.
///
/// The service owns long-lived handles to the extractor registry, both model clients,
/// and the session store. Construct it once near process start and share it through an
/// `Arc`.
pub struct QaService {
    extractors: ExtractorRegistry,
    embedding_client: Box<dyn EmbeddingClient>,
    generative_client: Box<dyn GenerativeClient>,
    sessions: SessionStore,
    metrics: Arc<QaMetrics>,
}

impl QaService {
    /// Build a service from the process-wide configuration.
    pub fn new() -> Self {
        let config = get_config();
        tracing::info!(
            embedding_model = %config.embedding_model,
            generation_model = %config.generation_model,
            max_documents = config.max_documents,
            "Initializing Q&A service"
        );
        Self::with_components(
            ExtractorRegistry::with_defaults(),
            Box::new(OllamaEmbeddingClient::new()),
            Box::new(GeminiClient::new()),
            config.max_documents,
        )
    }

    /// Build a service from explicit components.
    ///
    /// Used by tests and by embedders that register additional file formats or swap a
    /// model backend.
    pub fn with_components(
        extractors: ExtractorRegistry,
        embedding_client: Box<dyn EmbeddingClient>,
        generative_client: Box<dyn GenerativeClient>,
        max_documents: usize,
    ) -> Self {
        Self {
            extractors,
            embedding_client,
            generative_client,
            sessions: SessionStore::new(max_documents),
            metrics: Arc::new(QaMetrics::new()),
        }
    }

    /// Ingest a document end to end.
    ///
    /// All extraction and model work happens before the session registry is touched, so
    /// a failure at any step leaves the registry unchanged. The eviction-plus-insert at
    /// the end runs under the session's lock and is atomic with respect to other
    /// mutations of the same session.
    pub async fn ingest(
        &self,
        session_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<IngestOutcome, IngestError> {
        let extractor = self
            .extractors
            .for_file_name(file_name)
            .ok_or_else(|| IngestError::UnsupportedType(file_name.to_string()))?;

        let text = extractor.extract(bytes).map_err(|error| {
            tracing::warn!(file_name, error = %error, "Document extraction failed");
            error
        })?;

        let chunks = chunk_paragraphs(&text);
        if chunks.is_empty() {
            tracing::warn!(file_name, "No text could be extracted from the document");
            return Err(IngestError::NoContent);
        }

        let embeddings = self.embedding_client.embed(chunks.clone()).await?;

        // The embedding dimension is whatever the provider produced for this run.
        let dimension = embeddings
            .first()
            .map(Vec::len)
            .ok_or(EmbeddingClientError::Empty)?;
        let mut index = FlatL2Index::new(dimension);
        index.add(embeddings)?;

        let document_id = Uuid::new_v4();
        let chunk_count = chunks.len();
        let document = Document::new(
            document_id,
            file_name.to_string(),
            chunks,
            Box::new(index),
        );

        let registry = self.sessions.registry(session_id).await;
        registry.lock().await.insert(document);

        self.metrics.record_ingest(chunk_count as u64);
        tracing::info!(
            session_id,
            document_id = %document_id,
            file_name,
            chunks = chunk_count,
            dimension,
            "Document ingested"
        );

        Ok(IngestOutcome {
            document_id,
            file_name: file_name.to_string(),
            chunk_count,
        })
    }

    /// Answer a question about a stored document.
    ///
    /// The returned string may itself be an explanatory message: a missing document or a
    /// failed generation is reported to the user, not raised.
    pub async fn answer(
        &self,
        session_id: &str,
        document_id: Uuid,
        question: &str,
    ) -> Result<String, AnswerError> {
        let document = {
            let registry = self.sessions.registry(session_id).await;
            let guard = registry.lock().await;
            guard.get(&document_id)
        };
        let Some(document) = document else {
            tracing::debug!(session_id, document_id = %document_id, "Queried document not in registry");
            return Ok(DOCUMENT_NOT_FOUND_MESSAGE.to_string());
        };

        let mut vectors = self.embedding_client.embed(vec![question.to_string()]).await?;
        let query_vector = vectors.pop().ok_or(EmbeddingClientError::Empty)?;

        let neighbors = document.index.search(&query_vector, RETRIEVAL_TOP_K)?;
        let retrieved: Vec<&str> = neighbors
            .iter()
            .filter_map(|neighbor| document.chunks.get(neighbor.chunk))
            .map(String::as_str)
            .collect();
        let context = build_context(&retrieved);
        let prompt = build_prompt(&context, question);

        tracing::debug!(
            session_id,
            document_id = %document_id,
            retrieved = retrieved.len(),
            "Dispatching grounded prompt"
        );

        let answer = match self.generative_client.generate(&prompt).await {
            Ok(text) => text,
            Err(error) => {
                tracing::error!(session_id, document_id = %document_id, error = %error, "Answer generation failed");
                format!("An error occurred while generating the answer: {error}")
            }
        };

        self.metrics.record_answer();
        Ok(answer)
    }

    /// Enumerate the session's documents in insertion order.
    pub async fn list_documents(&self, session_id: &str) -> Vec<DocumentSummary> {
        let registry = self.sessions.registry(session_id).await;
        let guard = registry.lock().await;
        guard.list()
    }

    /// Remove the session's registry entirely, returning the number of documents dropped.
    pub async fn clear_session(&self, session_id: &str) -> usize {
        self.sessions.delete_session(session_id).await
    }

    /// Return the current activity counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl QaApi for QaService {
    async fn ingest(
        &self,
        session_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<IngestOutcome, IngestError> {
        QaService::ingest(self, session_id, file_name, bytes).await
    }

    async fn answer(
        &self,
        session_id: &str,
        document_id: Uuid,
        question: &str,
    ) -> Result<String, AnswerError> {
        QaService::answer(self, session_id, document_id, question).await
    }

    async fn list_documents(&self, session_id: &str) -> Vec<DocumentSummary> {
        QaService::list_documents(self, session_id).await
    }

    async fn clear_session(&self, session_id: &str) -> usize {
        QaService::clear_session(self, session_id).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        QaService::metrics_snapshot(self)
    }
}
