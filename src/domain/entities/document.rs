use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::value_objects::{IngestionStatus, MediaType};

/// An uploaded document. Owned by the ingestion pipeline from creation until
/// explicit deletion; deleting a document cascades to all of its chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: Uuid,
    name: String,
    media_type: MediaType,
    size_bytes: i64,
    content_hash: String,
    status: IngestionStatus,
    uploaded_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(name: String, media_type: MediaType, content: &[u8]) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            media_type,
            size_bytes: content.len() as i64,
            content_hash: Self::hash_content(content),
            status: IngestionStatus::Uploading,
            uploaded_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a document from stored values.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: Uuid,
        name: String,
        media_type: MediaType,
        size_bytes: i64,
        content_hash: String,
        status: IngestionStatus,
        uploaded_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            media_type,
            size_bytes,
            content_hash,
            status,
            uploaded_at,
            updated_at,
        }
    }

    pub fn hash_content(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        format!("{:x}", hasher.finalize())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn size_bytes(&self) -> i64 {
        self.size_bytes
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn status(&self) -> &IngestionStatus {
        &self.status
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn begin_processing(&mut self) -> Result<(), String> {
        self.transition(IngestionStatus::Processing)
    }

    pub fn complete(&mut self) -> Result<(), String> {
        self.transition(IngestionStatus::Completed)
    }

    pub fn fail(&mut self, cause: String) -> Result<(), String> {
        self.transition(IngestionStatus::Error(cause))
    }

    pub fn is_queryable(&self) -> bool {
        self.status.is_completed()
    }

    fn transition(&mut self, next: IngestionStatus) -> Result<(), String> {
        if !self.status.can_transition_to(&next) {
            return Err(format!(
                "invalid document transition: {} -> {}",
                self.status, next
            ));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
