//! In-memory, session-scoped document storage.
//!
//! Every session owns one [`DocumentRegistry`] with a bounded capacity and strict FIFO
//! eviction. All state is transient by design: nothing survives a process restart.

mod registry;
mod sessions;

pub use registry::{Document, DocumentRegistry, DocumentSummary};
pub use sessions::SessionStore;
