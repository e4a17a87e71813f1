use std::sync::Arc;

use uuid::Uuid;

use crate::domain::repositories::{
    DocumentRepository, DocumentRepositoryError, VectorIndex, VectorIndexError,
};

#[derive(Debug)]
pub enum DeleteDocumentError {
    NotFound(Uuid),
    Index(VectorIndexError),
    Repository(DocumentRepositoryError),
}

impl std::fmt::Display for DeleteDocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteDocumentError::NotFound(id) => write!(f, "Document not found: {}", id),
            DeleteDocumentError::Index(e) => write!(f, "Failed to delete chunks: {}", e),
            DeleteDocumentError::Repository(e) => write!(f, "Failed to delete document: {}", e),
        }
    }
}

impl std::error::Error for DeleteDocumentError {}

/// Deletes a document and all of its chunks. Chunks go first so that a
/// partial failure can never leave chunks pointing at a deleted document; a
/// chunkless document row is harmless and retryable.
pub struct DeleteDocumentUseCase {
    documents: Arc<dyn DocumentRepository>,
    vector_index: Arc<dyn VectorIndex>,
}

impl DeleteDocumentUseCase {
    pub fn new(documents: Arc<dyn DocumentRepository>, vector_index: Arc<dyn VectorIndex>) -> Self {
        Self {
            documents,
            vector_index,
        }
    }

    pub async fn execute(&self, document_id: Uuid) -> Result<(), DeleteDocumentError> {
        let found = self
            .documents
            .find_by_id(document_id)
            .await
            .map_err(DeleteDocumentError::Repository)?;
        if found.is_none() {
            return Err(DeleteDocumentError::NotFound(document_id));
        }

        let removed = self
            .vector_index
            .delete_document(document_id)
            .await
            .map_err(DeleteDocumentError::Index)?;

        let deleted = self
            .documents
            .delete(document_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    %document_id,
                    chunks_removed = removed,
                    "chunks deleted but document row removal failed"
                );
                DeleteDocumentError::Repository(e)
            })?;
        if !deleted {
            return Err(DeleteDocumentError::NotFound(document_id));
        }

        tracing::info!(%document_id, chunks_removed = removed, "deleted document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgvector::Vector;

    use crate::domain::entities::{Chunk, Document};
    use crate::domain::value_objects::MediaType;
    use crate::infrastructure::memory::{InMemoryDocumentRepository, InMemoryVectorIndex};

    #[tokio::test]
    async fn test_deletes_document_and_chunks() {
        let documents = Arc::new(InMemoryDocumentRepository::new());
        let index = Arc::new(InMemoryVectorIndex::new(2));

        let document = Document::new("notes.txt".to_string(), MediaType::PlainText, b"abcd");
        documents.save(&document).await.unwrap();
        index
            .upsert(&Chunk::new(
                document.id(),
                0,
                "abcd".to_string(),
                Vector::from(vec![1.0, 0.0]),
            ))
            .await
            .unwrap();

        let use_case = DeleteDocumentUseCase::new(documents.clone(), index.clone());
        use_case.execute(document.id()).await.unwrap();

        assert!(documents.find_by_id(document.id()).await.unwrap().is_none());
        assert_eq!(index.count_for_document(document.id()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let use_case = DeleteDocumentUseCase::new(
            Arc::new(InMemoryDocumentRepository::new()),
            Arc::new(InMemoryVectorIndex::new(2)),
        );

        let missing = Uuid::new_v4();
        let err = use_case.execute(missing).await.unwrap_err();
        assert!(matches!(err, DeleteDocumentError::NotFound(id) if id == missing));
    }
}
