use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};

/// Process-local document catalog matching the in-memory vector index.
pub struct InMemoryDocumentRepository {
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDocumentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn save(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        let mut documents = self.documents.write().await;
        documents.insert(document.id(), document.clone());
        Ok(())
    }

    async fn update(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        let mut documents = self.documents.write().await;
        if !documents.contains_key(&document.id()) {
            return Err(DocumentRepositoryError::NotFound(document.id()));
        }
        documents.insert(document.id(), document.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, DocumentRepositoryError> {
        let documents = self.documents.read().await;
        Ok(documents.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Document>, DocumentRepositoryError> {
        let documents = self.documents.read().await;
        let mut all: Vec<Document> = documents.values().cloned().collect();
        // Newest first, matching the persistent backend's ordering.
        all.sort_by(|a, b| b.uploaded_at().cmp(&a.uploaded_at()));
        Ok(all)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError> {
        let mut documents = self.documents.write().await;
        Ok(documents.remove(&id).is_some())
    }

    async fn count(&self) -> Result<i64, DocumentRepositoryError> {
        let documents = self.documents.read().await;
        Ok(documents.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::MediaType;

    fn sample(name: &str) -> Document {
        Document::new(name.to_string(), MediaType::PlainText, b"bytes")
    }

    #[tokio::test]
    async fn test_save_find_delete() {
        let repo = InMemoryDocumentRepository::new();
        let doc = sample("a.txt");
        repo.save(&doc).await.unwrap();

        assert!(repo.find_by_id(doc.id()).await.unwrap().is_some());
        assert_eq!(repo.count().await.unwrap(), 1);

        assert!(repo.delete(doc.id()).await.unwrap());
        assert!(!repo.delete(doc.id()).await.unwrap());
        assert!(repo.find_by_id(doc.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_requires_existing_row() {
        let repo = InMemoryDocumentRepository::new();
        let mut doc = sample("a.txt");

        assert!(matches!(
            repo.update(&doc).await,
            Err(DocumentRepositoryError::NotFound(_))
        ));

        repo.save(&doc).await.unwrap();
        doc.begin_processing().unwrap();
        repo.update(&doc).await.unwrap();

        let stored = repo.find_by_id(doc.id()).await.unwrap().unwrap();
        assert!(stored.status().is_processing());
    }
}
