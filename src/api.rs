//! HTTP surface for docqa.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `GET /documents` – List the session's documents in upload order.
//! - `POST /documents` – Upload a document body (`?file_name=` carries the original
//!   name); it is extracted, chunked, embedded, and indexed for the session.
//! - `POST /query` – Ask a question about a stored document; returns the generated
//!   answer (which may itself be an explanatory not-found or failure message).
//! - `DELETE /session` – Drop the session's registry and report the removed count.
//! - `GET /metrics` – Observe ingestion and answer counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery.
//!
//! Session identity is carried by the `X-Session-Id` header; cookie issuance belongs to
//! whatever fronts this service.

use crate::metrics::MetricsSnapshot;
use crate::processing::{AnswerError, IngestError, QaApi};
use crate::store::DocumentSummary;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Name of the header carrying the caller's session identifier.
pub const SESSION_HEADER: &str = "x-session-id";

/// Build the HTTP router exposing the document Q&A surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: QaApi + 'static,
{
    Router::new()
        .route(
            "/documents",
            get(list_documents::<S>).post(upload_document::<S>),
        )
        .route("/query", post(query_document::<S>))
        .route("/session", delete(clear_session::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

fn session_id(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(AppError::SessionMissing)
}

/// Response body for `GET /documents`.
#[derive(Serialize)]
struct DocumentsResponse {
    documents: Vec<DocumentSummary>,
}

/// List the session's documents, oldest first.
async fn list_documents<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
) -> Result<Json<DocumentsResponse>, AppError>
where
    S: QaApi,
{
    let session_id = session_id(&headers)?;
    let documents = service.list_documents(&session_id).await;
    Ok(Json(DocumentsResponse { documents }))
}

/// Query parameters for `POST /documents`.
#[derive(Deserialize)]
struct UploadParams {
    /// Original filename; its extension selects the extractor.
    file_name: String,
}

/// Success response for `POST /documents`.
#[derive(Serialize)]
struct UploadResponse {
    document_id: Uuid,
    file_name: String,
}

/// Upload a document for the session.
///
/// The raw request body is the file content. Ingestion is all-or-nothing: any failure
/// leaves the session registry untouched.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), AppError>
where
    S: QaApi,
{
    let session_id = session_id(&headers)?;
    let outcome = service
        .ingest(&session_id, &params.file_name, &body)
        .await?;
    tracing::info!(
        session_id,
        document_id = %outcome.document_id,
        file_name = %outcome.file_name,
        chunks = outcome.chunk_count,
        "Upload completed"
    );
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            document_id: outcome.document_id,
            file_name: outcome.file_name,
        }),
    ))
}

/// Request body for `POST /query`.
#[derive(Deserialize)]
struct QueryRequest {
    /// Identifier returned by the upload endpoint.
    document_id: String,
    /// Natural-language question about the document.
    question: String,
}

/// Response body for `POST /query`.
#[derive(Serialize)]
struct QueryResponse {
    answer: String,
}

/// Ask a question about a stored document.
async fn query_document<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError>
where
    S: QaApi,
{
    let session_id = session_id(&headers)?;
    let document_id = Uuid::parse_str(&request.document_id)
        .map_err(|_| AppError::BadRequest("document_id is not a valid identifier".into()))?;
    let answer = service
        .answer(&session_id, document_id, &request.question)
        .await?;
    Ok(Json(QueryResponse { answer }))
}

/// Response body for `DELETE /session`.
#[derive(Serialize)]
struct ClearSessionResponse {
    deleted_count: usize,
}

/// Remove the session's registry and everything it holds.
async fn clear_session<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
) -> Result<Json<ClearSessionResponse>, AppError>
where
    S: QaApi,
{
    let session_id = session_id(&headers)?;
    let deleted_count = service.clear_session(&session_id).await;
    Ok(Json(ClearSessionResponse { deleted_count }))
}

/// Return activity counters for observability.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: QaApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "list_documents",
                method: "GET",
                path: "/documents",
                description: "Return the session's documents as { id, name } pairs in upload order.",
                request_example: None,
            },
            CommandDescriptor {
                name: "upload_document",
                method: "POST",
                path: "/documents",
                description: "Upload a document body; it is chunked, embedded, and indexed for the session. Pass the original name via ?file_name=.",
                request_example: Some(json!({
                    "file_name": "notes.txt"
                })),
            },
            CommandDescriptor {
                name: "query_document",
                method: "POST",
                path: "/query",
                description: "Ask a question about a stored document; the answer is grounded in the top retrieved chunks.",
                request_example: Some(json!({
                    "document_id": "00000000-0000-0000-0000-000000000000",
                    "question": "What is the capital of France?"
                })),
            },
            CommandDescriptor {
                name: "clear_session",
                method: "DELETE",
                path: "/session",
                description: "Drop the session's documents and report how many were removed.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return ingestion and answer counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    SessionMissing,
    BadRequest(String),
    Ingest(IngestError),
    Answer(AnswerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::SessionMissing => (
                StatusCode::BAD_REQUEST,
                "No active session found. Send the X-Session-Id header.".to_string(),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Ingest(error) => {
                let status = match &error {
                    IngestError::UnsupportedType(_)
                    | IngestError::Extraction(_)
                    | IngestError::NoContent => StatusCode::UNPROCESSABLE_ENTITY,
                    IngestError::Embedding(_) => StatusCode::BAD_GATEWAY,
                    IngestError::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, error.to_string())
            }
            Self::Answer(error) => {
                let status = match &error {
                    AnswerError::Embedding(_) => StatusCode::BAD_GATEWAY,
                    AnswerError::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, error.to_string())
            }
        };
        (status, message).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(inner: IngestError) -> Self {
        Self::Ingest(inner)
    }
}

impl From<AnswerError> for AppError {
    fn from(inner: AnswerError) -> Self {
        Self::Answer(inner)
    }
}
