//! Ingestion pipeline and query engine: chunking, prompt assembly, and orchestration.

pub mod chunking;
pub mod prompt;
mod service;

pub use service::{
    AnswerError, DOCUMENT_NOT_FOUND_MESSAGE, IngestError, IngestOutcome, QaApi, QaService,
};
