use chrono::{DateTime, Utc};
use diesel::prelude::*;
use pgvector::Vector;
use uuid::Uuid;

use super::schema::{chunks, documents};
use crate::domain::entities::{Chunk, Document};
use crate::domain::value_objects::{IngestionStatus, MediaType};

#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentRow {
    pub id: Uuid,
    pub name: String,
    pub media_type: String,
    pub size_bytes: i64,
    pub content_hash: String,
    pub status: String,
    pub error_message: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRow {
    pub fn into_entity(self) -> Result<Document, String> {
        let media_type = MediaType::from_mime(&self.media_type)
            .ok_or_else(|| format!("Unknown stored media type: {}", self.media_type))?;
        let status = IngestionStatus::from_parts(&self.status, self.error_message)?;
        Ok(Document::from_parts(
            self.id,
            self.name,
            media_type,
            self.size_bytes,
            self.content_hash,
            status,
            self.uploaded_at,
            self.updated_at,
        ))
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentRow {
    pub id: Uuid,
    pub name: String,
    pub media_type: String,
    pub size_bytes: i64,
    pub content_hash: String,
    pub status: String,
    pub error_message: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewDocumentRow {
    pub fn from_entity(document: &Document) -> Self {
        Self {
            id: document.id(),
            name: document.name().to_string(),
            media_type: document.media_type().as_mime().to_string(),
            size_bytes: document.size_bytes(),
            content_hash: document.content_hash().to_string(),
            status: document.status().as_str().to_string(),
            error_message: document.status().error_message().map(|s| s.to_string()),
            uploaded_at: document.uploaded_at(),
            updated_at: document.updated_at(),
        }
    }
}

#[derive(Debug, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(DocumentRow, foreign_key = document_id))]
#[diesel(table_name = chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChunkRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub chunk_index: i32,
    pub content: String,
    pub embedding: Vector,
    pub created_at: DateTime<Utc>,
}

impl ChunkRow {
    pub fn into_entity(self) -> Chunk {
        Chunk::from_parts(
            self.id,
            self.document_id,
            self.chunk_index,
            self.content,
            self.embedding,
            self.created_at,
        )
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewChunkRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub chunk_index: i32,
    pub content: String,
    pub embedding: Vector,
    pub created_at: DateTime<Utc>,
}

impl NewChunkRow {
    pub fn from_entity(chunk: &Chunk) -> Self {
        Self {
            id: chunk.id(),
            document_id: chunk.document_id(),
            chunk_index: chunk.chunk_index(),
            content: chunk.text().to_string(),
            embedding: chunk.embedding().clone(),
            created_at: chunk.created_at(),
        }
    }
}
