//! Process-wide map from session identifier to document registry.

use crate::store::registry::DocumentRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared, lock-guarded session state.
///
/// The outer `RwLock` guards session creation, lookup, and deletion. Each registry sits
/// behind its own `Mutex`, so mutations of one session serialize (eviction plus insert
/// stay atomic) while different sessions proceed independently.
pub struct SessionStore {
    max_documents: usize,
    sessions: RwLock<HashMap<String, Arc<Mutex<DocumentRegistry>>>>,
}

impl SessionStore {
    /// Create an empty store whose registries hold at most `max_documents` entries.
    pub fn new(max_documents: usize) -> Self {
        Self {
            max_documents,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get the registry for a session, creating an empty one on first access.
    pub async fn registry(&self, session_id: &str) -> Arc<Mutex<DocumentRegistry>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(registry) = sessions.get(session_id) {
                return Arc::clone(registry);
            }
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(sessions.entry(session_id.to_string()).or_insert_with(|| {
            tracing::debug!(session_id, "Created session registry");
            Arc::new(Mutex::new(DocumentRegistry::with_capacity(
                self.max_documents,
            )))
        }))
    }

    /// Remove a session and everything it holds, returning the number of documents dropped.
    ///
    /// Deleting an unknown session is not an error and reports zero.
    pub async fn delete_session(&self, session_id: &str) -> usize {
        let removed = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(session_id)
        };
        match removed {
            Some(registry) => {
                let count = registry.lock().await.len();
                tracing::info!(session_id, documents = count, "Deleted session");
                count
            }
            None => 0,
        }
    }

    /// Number of live sessions, used for diagnostics.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{FlatL2Index, VectorIndex};
    use crate::store::registry::Document;
    use uuid::Uuid;

    fn document(name: &str) -> Document {
        let mut index = FlatL2Index::new(2);
        index.add(vec![vec![0.0, 1.0]]).unwrap();
        Document::new(
            Uuid::new_v4(),
            name.to_string(),
            vec![format!("{name} text")],
            Box::new(index),
        )
    }

    #[tokio::test]
    async fn registry_is_created_on_first_access() {
        let store = SessionStore::new(3);
        assert_eq!(store.session_count().await, 0);

        let registry = store.registry("alpha").await;
        assert!(registry.lock().await.is_empty());
        assert_eq!(store.session_count().await, 1);

        // Second access is idempotent and returns the same registry.
        let again = store.registry("alpha").await;
        assert!(Arc::ptr_eq(&registry, &again));
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new(3);
        let doc = document("a.txt");
        let doc_id = doc.id;
        store.registry("alpha").await.lock().await.insert(doc);

        let beta = store.registry("beta").await;
        assert!(beta.lock().await.get(&doc_id).is_none());
        assert!(beta.lock().await.list().is_empty());
    }

    #[tokio::test]
    async fn delete_session_reports_document_count() {
        let store = SessionStore::new(3);
        {
            let registry = store.registry("alpha").await;
            let mut guard = registry.lock().await;
            guard.insert(document("a"));
            guard.insert(document("b"));
        }

        assert_eq!(store.delete_session("alpha").await, 2);
        assert_eq!(store.session_count().await, 0);

        // Recreated session starts empty.
        let registry = store.registry("alpha").await;
        assert!(registry.lock().await.list().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_session_is_safe() {
        let store = SessionStore::new(3);
        assert_eq!(store.delete_session("ghost").await, 0);
    }
}
