use async_trait::async_trait;
use pgvector::Vector;
use uuid::Uuid;

use crate::domain::entities::Chunk;

#[derive(Debug)]
pub enum VectorIndexError {
    DimensionMismatch { expected: usize, actual: usize },
    NotFound(Uuid),
    Backend(String),
}

impl std::fmt::Display for VectorIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorIndexError::DimensionMismatch { expected, actual } => {
                write!(f, "Vector dimension mismatch: expected {}, got {}", expected, actual)
            }
            VectorIndexError::NotFound(id) => write!(f, "Chunk not found: {}", id),
            VectorIndexError::Backend(msg) => write!(f, "Index error: {}", msg),
        }
    }
}

impl std::error::Error for VectorIndexError {}

/// A chunk returned by a similarity search, carrying its transient score.
/// Scores are never persisted.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Cosine similarity normalized to `[0, 1]` as `(cos + 1) / 2`. The
/// similarity threshold passed to `search` is compared against this
/// normalized score directly.
pub fn normalized_cosine(a: &Vector, b: &Vector) -> f32 {
    let a = a.as_slice();
    let b = b.as_slice();
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b) + 1.0) / 2.0
}

/// Persists chunks with their embeddings and answers nearest-neighbor
/// queries. All vectors in one index share a single fixed dimension; inserts
/// and queries with a different dimension fail with `DimensionMismatch`.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts or replaces a chunk. Atomic with respect to concurrent reads.
    async fn upsert(&self, chunk: &Chunk) -> Result<(), VectorIndexError>;

    async fn upsert_batch(&self, chunks: &[Chunk]) -> Result<(), VectorIndexError>;

    /// Returns at most `top_k` chunks with normalized cosine score `>=
    /// threshold`, descending by score, ties broken by ascending chunk
    /// sequence index. `document_id` restricts results to one document.
    async fn search(
        &self,
        query: &Vector,
        threshold: f32,
        top_k: usize,
        document_id: Option<Uuid>,
    ) -> Result<Vec<ScoredChunk>, VectorIndexError>;

    /// Removes all chunks owned by the document, all-or-nothing. Returns the
    /// number of chunks removed.
    async fn delete_document(&self, document_id: Uuid) -> Result<u64, VectorIndexError>;

    async fn count_for_document(&self, document_id: Uuid) -> Result<i64, VectorIndexError>;
}
