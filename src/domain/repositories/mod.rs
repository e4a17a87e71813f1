pub mod document_repository;
pub mod vector_index;

pub use document_repository::{DocumentRepository, DocumentRepositoryError};
pub use vector_index::{ScoredChunk, VectorIndex, VectorIndexError, normalized_cosine};
