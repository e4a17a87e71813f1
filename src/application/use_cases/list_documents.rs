use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};

/// Read-side queries over the document catalog.
pub struct ListDocumentsUseCase {
    documents: Arc<dyn DocumentRepository>,
}

impl ListDocumentsUseCase {
    pub fn new(documents: Arc<dyn DocumentRepository>) -> Self {
        Self { documents }
    }

    pub async fn list(&self) -> Result<Vec<Document>, DocumentRepositoryError> {
        self.documents.find_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Document, DocumentRepositoryError> {
        self.documents
            .find_by_id(id)
            .await?
            .ok_or(DocumentRepositoryError::NotFound(id))
    }
}
