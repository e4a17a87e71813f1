use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::time::timeout;
use uuid::Uuid;

use crate::application::ports::embedding_provider::{EmbeddingProvider, ProviderError};
use crate::application::ports::text_extractor::{ExtractionError, TextExtractor};
use crate::application::services::chunker::Chunker;
use crate::domain::entities::{Chunk, Document};
use crate::domain::repositories::{VectorIndex, VectorIndexError};

#[derive(Debug)]
pub enum IngestionError {
    Extraction(ExtractionError),
    Embedding(ProviderError),
    Index(VectorIndexError),
    Cancelled,
}

impl std::fmt::Display for IngestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionError::Extraction(e) => write!(f, "{}", e),
            IngestionError::Embedding(e) => write!(f, "Embedding failed: {}", e),
            IngestionError::Index(e) => write!(f, "Index write failed: {}", e),
            IngestionError::Cancelled => write!(f, "Ingestion cancelled"),
        }
    }
}

impl std::error::Error for IngestionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub chunks_created: usize,
    pub extracted_chars: usize,
}

/// Stages of one ingestion run, reported to the job registry as progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Extracting,
    Chunking,
    Embedding,
    Persisting,
}

impl IngestStage {
    pub fn describe(&self) -> &'static str {
        match self {
            IngestStage::Extracting => "extracting text",
            IngestStage::Chunking => "splitting into chunks",
            IngestStage::Embedding => "embedding chunks",
            IngestStage::Persisting => "persisting chunks",
        }
    }
}

/// Drives one document through extract -> chunk -> embed -> persist.
///
/// Chunk sequence indices are assigned before any embedding is dispatched,
/// and concurrent embedding (bounded by `embed_concurrency`) yields results
/// in input order, so persisted vectors are always attributable to the right
/// span. Any failure or cancellation removes the chunks already written for
/// the document, leaving nothing partial visible.
pub struct IngestionService {
    extractor: Arc<dyn TextExtractor>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_index: Arc<dyn VectorIndex>,
    chunker: Chunker,
    embed_concurrency: usize,
    provider_timeout: Duration,
}

impl IngestionService {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_index: Arc<dyn VectorIndex>,
        chunker: Chunker,
        embed_concurrency: usize,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            embedding_provider,
            vector_index,
            chunker,
            embed_concurrency: embed_concurrency.max(1),
            provider_timeout,
        }
    }

    pub async fn ingest<F>(
        &self,
        document: &Document,
        data: &[u8],
        cancelled: &AtomicBool,
        mut on_stage: F,
    ) -> Result<IngestReport, IngestionError>
    where
        F: FnMut(IngestStage),
    {
        let document_id = document.id();

        self.check_cancel(document_id, cancelled).await?;
        on_stage(IngestStage::Extracting);
        let text = self
            .extractor
            .extract(data, document.media_type())
            .await
            .map_err(IngestionError::Extraction)?;

        self.check_cancel(document_id, cancelled).await?;
        on_stage(IngestStage::Chunking);
        let spans = self.chunker.split(&text);
        if spans.is_empty() {
            // An empty document completes with zero queryable chunks.
            return Ok(IngestReport {
                chunks_created: 0,
                extracted_chars: 0,
            });
        }

        self.check_cancel(document_id, cancelled).await?;
        on_stage(IngestStage::Embedding);
        let chunks = match self.embed_spans(document_id, &spans).await {
            Ok(chunks) => chunks,
            Err(e) => {
                self.cleanup(document_id).await;
                return Err(e);
            }
        };

        if cancelled.load(Ordering::SeqCst) {
            self.cleanup(document_id).await;
            return Err(IngestionError::Cancelled);
        }
        on_stage(IngestStage::Persisting);
        if let Err(e) = self.vector_index.upsert_batch(&chunks).await {
            self.cleanup(document_id).await;
            return Err(IngestionError::Index(e));
        }

        tracing::info!(
            %document_id,
            chunks = chunks.len(),
            chars = text.chars().count(),
            "document ingested"
        );

        Ok(IngestReport {
            chunks_created: chunks.len(),
            extracted_chars: text.chars().count(),
        })
    }

    async fn embed_spans(
        &self,
        document_id: Uuid,
        spans: &[String],
    ) -> Result<Vec<Chunk>, IngestionError> {
        let provider_timeout = self.provider_timeout;
        let timeout_secs = provider_timeout.as_secs();

        // Indices are fixed at enumeration time; `buffered` preserves input
        // order no matter which embedding call finishes first.
        let embeds = spans.iter().enumerate().map(|(index, span)| {
            let provider = self.embedding_provider.clone();
            let span = span.clone();
            async move {
                let vector = timeout(provider_timeout, provider.embed(&span))
                    .await
                    .map_err(|_| IngestionError::Embedding(ProviderError::Timeout(timeout_secs)))?
                    .map_err(IngestionError::Embedding)?;
                Ok::<Chunk, IngestionError>(Chunk::new(document_id, index as i32, span, vector))
            }
        });

        // Boxing erases the combinator's future type, which otherwise fails
        // the Send bound when awaited from a spawned worker task.
        stream::iter(embeds)
            .buffered(self.embed_concurrency)
            .boxed()
            .try_collect()
            .await
    }

    async fn check_cancel(
        &self,
        document_id: Uuid,
        cancelled: &AtomicBool,
    ) -> Result<(), IngestionError> {
        if cancelled.load(Ordering::SeqCst) {
            self.cleanup(document_id).await;
            return Err(IngestionError::Cancelled);
        }
        Ok(())
    }

    /// Best-effort removal of partially written chunks so the document is
    /// never visible with a mixed chunk set. A failure here is a consistency
    /// violation and is logged loudly rather than swallowed.
    async fn cleanup(&self, document_id: Uuid) {
        if let Err(e) = self.vector_index.delete_document(document_id).await {
            tracing::error!(%document_id, error = %e, "failed to clean up chunks after aborted ingestion");
        }
    }
}
