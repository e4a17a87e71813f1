use std::collections::HashMap;

use async_trait::async_trait;
use pgvector::Vector;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::Chunk;
use crate::domain::repositories::{ScoredChunk, VectorIndex, VectorIndexError, normalized_cosine};

/// Vector index backed by a process-local map. Suitable for single-node
/// deployments and tests; contents do not survive a restart.
pub struct InMemoryVectorIndex {
    dimension: usize,
    chunks: RwLock<HashMap<Uuid, Chunk>>,
}

impl InMemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            chunks: RwLock::new(HashMap::new()),
        }
    }

    fn check_dimension(&self, vector: &Vector) -> Result<(), VectorIndexError> {
        let actual = vector.as_slice().len();
        if actual != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, chunk: &Chunk) -> Result<(), VectorIndexError> {
        self.check_dimension(chunk.embedding())?;
        let mut chunks = self.chunks.write().await;
        chunks.insert(chunk.id(), chunk.clone());
        Ok(())
    }

    async fn upsert_batch(&self, batch: &[Chunk]) -> Result<(), VectorIndexError> {
        for chunk in batch {
            self.check_dimension(chunk.embedding())?;
        }
        // Validation happens before the write lock so a bad chunk leaves the
        // index untouched.
        let mut chunks = self.chunks.write().await;
        for chunk in batch {
            chunks.insert(chunk.id(), chunk.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &Vector,
        threshold: f32,
        top_k: usize,
        document_id: Option<Uuid>,
    ) -> Result<Vec<ScoredChunk>, VectorIndexError> {
        self.check_dimension(query)?;
        let chunks = self.chunks.read().await;

        let mut scored: Vec<ScoredChunk> = chunks
            .values()
            .filter(|chunk| document_id.is_none_or(|id| chunk.document_id() == id))
            .map(|chunk| ScoredChunk {
                score: normalized_cosine(query, chunk.embedding()),
                chunk: chunk.clone(),
            })
            .filter(|scored| scored.score >= threshold)
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.chunk_index().cmp(&b.chunk.chunk_index()))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<u64, VectorIndexError> {
        let mut chunks = self.chunks.write().await;
        let before = chunks.len();
        chunks.retain(|_, chunk| chunk.document_id() != document_id);
        Ok((before - chunks.len()) as u64)
    }

    async fn count_for_document(&self, document_id: Uuid) -> Result<i64, VectorIndexError> {
        let chunks = self.chunks.read().await;
        Ok(chunks
            .values()
            .filter(|chunk| chunk.document_id() == document_id)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(document_id: Uuid, index: i32, embedding: Vec<f32>) -> Chunk {
        Chunk::new(
            document_id,
            index,
            format!("span {}", index),
            Vector::from(embedding),
        )
    }

    #[tokio::test]
    async fn test_search_orders_by_score_descending() {
        let index = InMemoryVectorIndex::new(2);
        let doc = Uuid::new_v4();
        index.upsert(&chunk(doc, 0, vec![1.0, 0.0])).await.unwrap();
        index.upsert(&chunk(doc, 1, vec![0.8, 0.6])).await.unwrap();
        index.upsert(&chunk(doc, 2, vec![0.0, 1.0])).await.unwrap();

        let results = index
            .search(&Vector::from(vec![1.0, 0.0]), 0.0, 10, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.chunk_index(), 0);
        assert_eq!(results[1].chunk.chunk_index(), 1);
        assert_eq!(results[2].chunk.chunk_index(), 2);
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[tokio::test]
    async fn test_equal_scores_break_ties_by_sequence_index() {
        let index = InMemoryVectorIndex::new(2);
        let doc = Uuid::new_v4();
        // Same embedding, shuffled insertion order.
        index.upsert(&chunk(doc, 2, vec![1.0, 0.0])).await.unwrap();
        index.upsert(&chunk(doc, 0, vec![1.0, 0.0])).await.unwrap();
        index.upsert(&chunk(doc, 1, vec![1.0, 0.0])).await.unwrap();

        let results = index
            .search(&Vector::from(vec![1.0, 0.0]), 0.0, 10, None)
            .await
            .unwrap();

        let order: Vec<i32> = results.iter().map(|s| s.chunk.chunk_index()).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_threshold_excludes_weak_matches() {
        let index = InMemoryVectorIndex::new(2);
        let doc = Uuid::new_v4();
        index.upsert(&chunk(doc, 0, vec![1.0, 0.0])).await.unwrap();
        index.upsert(&chunk(doc, 1, vec![-1.0, 0.0])).await.unwrap();

        let results = index
            .search(&Vector::from(vec![1.0, 0.0]), 0.7, 10, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.chunk_index(), 0);
    }

    #[tokio::test]
    async fn test_top_k_bounds_result_count() {
        let index = InMemoryVectorIndex::new(2);
        let doc = Uuid::new_v4();
        for i in 0..10 {
            index.upsert(&chunk(doc, i, vec![1.0, 0.0])).await.unwrap();
        }

        let results = index
            .search(&Vector::from(vec![1.0, 0.0]), 0.0, 3, None)
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_document_scope_filters_other_documents() {
        let index = InMemoryVectorIndex::new(2);
        let doc_a = Uuid::new_v4();
        let doc_b = Uuid::new_v4();
        index.upsert(&chunk(doc_a, 0, vec![1.0, 0.0])).await.unwrap();
        index.upsert(&chunk(doc_b, 0, vec![1.0, 0.0])).await.unwrap();

        let results = index
            .search(&Vector::from(vec![1.0, 0.0]), 0.0, 10, Some(doc_a))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.document_id(), doc_a);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let index = InMemoryVectorIndex::new(2);
        let doc = Uuid::new_v4();

        let err = index
            .upsert(&chunk(doc, 0, vec![1.0, 0.0, 0.0]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VectorIndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));

        let err = index
            .search(&Vector::from(vec![1.0]), 0.0, 10, None)
            .await
            .unwrap_err();
        assert!(matches!(err, VectorIndexError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_delete_document_empties_its_chunks() {
        let index = InMemoryVectorIndex::new(2);
        let doc_a = Uuid::new_v4();
        let doc_b = Uuid::new_v4();
        index.upsert(&chunk(doc_a, 0, vec![1.0, 0.0])).await.unwrap();
        index.upsert(&chunk(doc_a, 1, vec![0.0, 1.0])).await.unwrap();
        index.upsert(&chunk(doc_b, 0, vec![1.0, 0.0])).await.unwrap();

        let removed = index.delete_document(doc_a).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(index.count_for_document(doc_a).await.unwrap(), 0);
        assert_eq!(index.count_for_document(doc_b).await.unwrap(), 1);

        let results = index
            .search(&Vector::from(vec![1.0, 0.0]), 0.0, 10, Some(doc_a))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_chunk() {
        let index = InMemoryVectorIndex::new(2);
        let doc = Uuid::new_v4();
        let original = chunk(doc, 0, vec![1.0, 0.0]);
        index.upsert(&original).await.unwrap();

        let replacement = Chunk::from_parts(
            original.id(),
            doc,
            0,
            "revised span".to_string(),
            Vector::from(vec![0.0, 1.0]),
            original.created_at(),
        );
        index.upsert(&replacement).await.unwrap();

        assert_eq!(index.count_for_document(doc).await.unwrap(), 1);
        let results = index
            .search(&Vector::from(vec![0.0, 1.0]), 0.9, 10, None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.text(), "revised span");
    }
}
