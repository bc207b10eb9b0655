//! Bounded, insertion-ordered document collection for a single session.

use crate::index::VectorIndex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

/// A fully ingested document: extracted chunks plus the index built over their embeddings.
///
/// Documents are immutable once constructed and always constructed whole; a failed
/// ingestion never produces one.
pub struct Document {
    /// Unique identifier assigned at ingestion.
    pub id: Uuid,
    /// Original filename supplied by the uploader.
    pub name: String,
    /// Ordered, non-empty text passages. The chunk position is the key returned by
    /// index searches.
    pub chunks: Vec<String>,
    /// Nearest-neighbor index over the chunk embeddings.
    pub index: Box<dyn VectorIndex>,
}

impl Document {
    /// Assemble a document, enforcing that every chunk has exactly one vector in the index.
    pub fn new(id: Uuid, name: String, chunks: Vec<String>, index: Box<dyn VectorIndex>) -> Self {
        assert_eq!(
            chunks.len(),
            index.len(),
            "document chunks and index entries must correspond one-to-one"
        );
        Self {
            id,
            name,
            chunks,
            index,
        }
    }
}

/// Identifier/name pair reported by [`DocumentRegistry::list`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DocumentSummary {
    /// Document identifier usable in query requests.
    pub id: Uuid,
    /// Original filename.
    pub name: String,
}

/// Insertion-ordered document map with bounded capacity and FIFO eviction.
///
/// Eviction is strictly by insertion order: querying a document does not refresh its
/// recency. The order/map split gives O(1) amortized insert, evict, and lookup.
pub struct DocumentRegistry {
    capacity: usize,
    order: VecDeque<Uuid>,
    documents: HashMap<Uuid, Arc<Document>>,
}

impl DocumentRegistry {
    /// Create an empty registry holding at most `capacity` documents.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "registry capacity must be positive");
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            documents: HashMap::with_capacity(capacity),
        }
    }

    /// Enumerate stored documents oldest-first.
    pub fn list(&self) -> Vec<DocumentSummary> {
        self.order
            .iter()
            .filter_map(|id| self.documents.get(id))
            .map(|doc| DocumentSummary {
                id: doc.id,
                name: doc.name.clone(),
            })
            .collect()
    }

    /// Insert a document, evicting the oldest entry first when the registry is full.
    pub fn insert(&mut self, document: Document) {
        if self.order.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.documents.remove(&evicted);
                tracing::debug!(document_id = %evicted, "Evicted oldest document at capacity");
            }
        }
        let id = document.id;
        self.order.push_back(id);
        self.documents.insert(id, Arc::new(document));
    }

    /// Look up a document by identifier.
    pub fn get(&self, id: &Uuid) -> Option<Arc<Document>> {
        self.documents.get(id).cloned()
    }

    /// Remove every document, returning how many were held.
    pub fn clear(&mut self) -> usize {
        let removed = self.order.len();
        self.order.clear();
        self.documents.clear();
        removed
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry holds no documents.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FlatL2Index;

    fn document(name: &str) -> Document {
        let chunks = vec![format!("{name} body")];
        let mut index = FlatL2Index::new(2);
        index.add(vec![vec![1.0, 0.0]]).unwrap();
        Document::new(Uuid::new_v4(), name.to_string(), chunks, Box::new(index))
    }

    #[test]
    fn list_preserves_insertion_order() {
        let mut registry = DocumentRegistry::with_capacity(3);
        registry.insert(document("a.txt"));
        registry.insert(document("b.txt"));
        registry.insert(document("c.txt"));

        let names: Vec<String> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn insert_at_capacity_evicts_oldest() {
        let mut registry = DocumentRegistry::with_capacity(3);
        registry.insert(document("d1"));
        let survivor = document("d2");
        let survivor_id = survivor.id;
        registry.insert(survivor);
        registry.insert(document("d3"));
        registry.insert(document("d4"));

        assert_eq!(registry.len(), 3);
        let names: Vec<String> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["d2", "d3", "d4"]);
        assert!(registry.get(&survivor_id).is_some());
    }

    #[test]
    fn capacity_bound_holds_under_many_insertions() {
        let mut registry = DocumentRegistry::with_capacity(3);
        for i in 0..20 {
            registry.insert(document(&format!("doc-{i}")));
            assert!(registry.len() <= 3);
        }
    }

    #[test]
    fn get_does_not_refresh_eviction_order() {
        let mut registry = DocumentRegistry::with_capacity(2);
        let first = document("first");
        let first_id = first.id;
        registry.insert(first);
        registry.insert(document("second"));

        // Access the oldest entry, then insert. FIFO still evicts it.
        assert!(registry.get(&first_id).is_some());
        registry.insert(document("third"));
        assert!(registry.get(&first_id).is_none());
    }

    #[test]
    fn list_is_idempotent() {
        let mut registry = DocumentRegistry::with_capacity(3);
        registry.insert(document("a"));
        registry.insert(document("b"));
        assert_eq!(registry.list(), registry.list());
    }

    #[test]
    fn clear_reports_removed_count() {
        let mut registry = DocumentRegistry::with_capacity(3);
        registry.insert(document("a"));
        registry.insert(document("b"));

        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
        assert_eq!(registry.clear(), 0);
    }
}
