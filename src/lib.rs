#![deny(missing_docs)]

//! Core library for the docqa document question-answering server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and HTTP backend.
pub mod embedding;
/// File-type dispatch and text extraction.
pub mod extract;
/// Generative model client abstraction and HTTP backend.
pub mod generation;
/// Exact nearest-neighbor vector index.
pub mod index;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion and query metrics helpers.
pub mod metrics;
/// Ingestion pipeline and query engine.
pub mod processing;
/// Session-scoped document registries.
pub mod store;
