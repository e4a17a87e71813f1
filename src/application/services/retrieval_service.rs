use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use uuid::Uuid;

use crate::application::ports::embedding_provider::{EmbeddingProvider, ProviderError};
use crate::domain::repositories::{ScoredChunk, VectorIndex, VectorIndexError};

#[derive(Debug)]
pub enum RetrievalError {
    Provider(ProviderError),
    Index(VectorIndexError),
}

impl std::fmt::Display for RetrievalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrievalError::Provider(e) => write!(f, "Embedding error: {}", e),
            RetrievalError::Index(e) => write!(f, "Index error: {}", e),
        }
    }
}

impl std::error::Error for RetrievalError {}

/// Embeds a query and runs the similarity search against the vector index,
/// optionally scoped to a single document.
pub struct RetrievalService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_index: Arc<dyn VectorIndex>,
    similarity_threshold: f32,
    top_k: usize,
    provider_timeout: Duration,
}

impl RetrievalService {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_index: Arc<dyn VectorIndex>,
        similarity_threshold: f32,
        top_k: usize,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            embedding_provider,
            vector_index,
            similarity_threshold,
            top_k,
            provider_timeout,
        }
    }

    pub async fn retrieve(
        &self,
        query: &str,
        document_id: Option<Uuid>,
    ) -> Result<Vec<ScoredChunk>, RetrievalError> {
        let query_vector = timeout(self.provider_timeout, self.embedding_provider.embed(query))
            .await
            .map_err(|_| {
                RetrievalError::Provider(ProviderError::Timeout(self.provider_timeout.as_secs()))
            })?
            .map_err(RetrievalError::Provider)?;

        self.vector_index
            .search(&query_vector, self.similarity_threshold, self.top_k, document_id)
            .await
            .map_err(RetrievalError::Index)
    }
}
