use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A contiguous, overlapping text window of a document together with its
/// embedding. The sequence index is 0-based and fixes the chunk's position in
/// the original text regardless of the order embeddings were produced in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    id: Uuid,
    document_id: Uuid,
    chunk_index: i32,
    text: String,
    embedding: Vector,
    created_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(document_id: Uuid, chunk_index: i32, text: String, embedding: Vector) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            chunk_index,
            text,
            embedding,
            created_at: Utc::now(),
        }
    }

    pub fn from_parts(
        id: Uuid,
        document_id: Uuid,
        chunk_index: i32,
        text: String,
        embedding: Vector,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            document_id,
            chunk_index,
            text,
            embedding,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn chunk_index(&self) -> i32 {
        self.chunk_index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> &Vector {
        &self.embedding
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn dimension(&self) -> usize {
        self.embedding.as_slice().len()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}
