//! Exact nearest-neighbor search over chunk embeddings.
//!
//! Each ingested document owns one index built over the embeddings of its chunks. The
//! backend is deliberately abstracted behind [`VectorIndex`] so an approximate structure
//! could replace the flat scan without touching the registry or the query engine.

use thiserror::Error;

/// Errors raised by vector index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A vector did not match the dimensionality the index was constructed with.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality fixed at index construction.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },
}

/// A ranked search result pointing back into the owning document's chunk list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the matched chunk in the document's chunk sequence.
    pub chunk: usize,
    /// Squared L2 distance between the query and the chunk embedding.
    pub distance: f32,
}

/// Nearest-neighbor search capability over fixed-dimension embeddings.
pub trait VectorIndex: Send + Sync {
    /// Append vectors to the index, preserving insertion order as the chunk key.
    fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), IndexError>;

    /// Return up to `k` neighbors ranked by ascending distance.
    ///
    /// Results are deterministic for a fixed index and query: ties are broken by
    /// ascending chunk position.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError>;

    /// Number of vectors currently held by the index.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flat, exact-search index using squared L2 distance.
///
/// A brute-force scan is appropriate here: indexes are per-document and a session holds
/// at most a handful of documents, so the collection stays small.
pub struct FlatL2Index {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatL2Index {
    /// Create an empty index accepting vectors of the given dimensionality.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Dimensionality this index was constructed with.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| {
                let diff = x - y;
                diff * diff
            })
            .sum()
    }
}

impl VectorIndex for FlatL2Index {
    fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), IndexError> {
        for vector in &vectors {
            if vector.len() != self.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }
        self.vectors.extend(vectors);
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(chunk, vector)| Neighbor {
                chunk,
                distance: Self::squared_l2(query, vector),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.chunk.cmp(&b.chunk))
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_index(vectors: Vec<Vec<f32>>) -> FlatL2Index {
        let mut index = FlatL2Index::new(vectors[0].len());
        index.add(vectors).expect("vectors fit dimension");
        index
    }

    #[test]
    fn search_ranks_by_ascending_distance() {
        let index = build_index(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.9, 0.1],
        ]);

        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].chunk, 1);
        assert_eq!(hits[1].chunk, 2);
        assert_eq!(hits[2].chunk, 0);
        assert!(hits[0].distance <= hits[1].distance);
        assert!(hits[1].distance <= hits[2].distance);
    }

    #[test]
    fn search_breaks_ties_by_chunk_position() {
        let index = build_index(vec![
            vec![0.0, 1.0],
            vec![0.0, -1.0],
            vec![0.0, 1.0],
        ]);

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let order: Vec<usize> = hits.iter().map(|hit| hit.chunk).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn search_clamps_k_to_index_size() {
        let index = build_index(vec![vec![1.0, 2.0]]);
        let hits = index.search(&[1.0, 2.0], 3).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, 0.0);
    }

    #[test]
    fn add_rejects_mismatched_dimension() {
        let mut index = FlatL2Index::new(3);
        let error = index.add(vec![vec![1.0, 2.0]]).unwrap_err();
        assert!(matches!(
            error,
            IndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn search_rejects_mismatched_query() {
        let index = build_index(vec![vec![1.0, 2.0]]);
        let error = index.search(&[1.0, 2.0, 3.0], 1).unwrap_err();
        assert!(matches!(error, IndexError::DimensionMismatch { .. }));
    }

    #[test]
    fn results_are_deterministic() {
        let index = build_index(vec![
            vec![0.5, 0.5],
            vec![0.4, 0.6],
            vec![0.6, 0.4],
        ]);
        let first = index.search(&[0.45, 0.55], 2).unwrap();
        let second = index.search(&[0.45, 0.55], 2).unwrap();
        assert_eq!(first, second);
    }
}
