use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use uuid::Uuid;

use crate::application::ports::embedding_provider::ProviderError;
use crate::application::ports::response_generator::ResponseGenerator;
use crate::application::services::context_assembler::ContextAssembler;
use crate::application::services::retrieval_service::{RetrievalError, RetrievalService};
use crate::domain::entities::Message;
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError, ScoredChunk};

#[derive(Debug)]
pub enum ChatError {
    EmptyQuery,
    Retrieval(RetrievalError),
    Generation(ProviderError),
    Repository(DocumentRepositoryError),
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatError::EmptyQuery => write!(f, "Query cannot be empty"),
            ChatError::Retrieval(e) => write!(f, "Retrieval failed: {}", e),
            ChatError::Generation(e) => write!(f, "Generation failed: {}", e),
            ChatError::Repository(e) => write!(f, "Repository error: {}", e),
        }
    }
}

impl std::error::Error for ChatError {}

impl ChatError {
    /// Query-time provider failures surface to the caller as one retryable
    /// error; the UI decides whether to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChatError::Retrieval(_) | ChatError::Generation(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatAnswer {
    pub answer: String,
    /// Names of the documents the answer was grounded on, in rank order.
    pub sources: Vec<String>,
}

/// Orchestrates one question-answer round: validate, retrieve, assemble the
/// bounded prompt, generate, and resolve cited document names.
pub struct ChatService {
    retrieval: Arc<RetrievalService>,
    generator: Arc<dyn ResponseGenerator>,
    documents: Arc<dyn DocumentRepository>,
    assembler: ContextAssembler,
    provider_timeout: Duration,
}

impl ChatService {
    pub fn new(
        retrieval: Arc<RetrievalService>,
        generator: Arc<dyn ResponseGenerator>,
        documents: Arc<dyn DocumentRepository>,
        assembler: ContextAssembler,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            retrieval,
            generator,
            documents,
            assembler,
            provider_timeout,
        }
    }

    pub async fn answer(
        &self,
        query: &str,
        document_scope: Option<Uuid>,
        history: &[Message],
    ) -> Result<ChatAnswer, ChatError> {
        if query.trim().is_empty() {
            return Err(ChatError::EmptyQuery);
        }

        let ranked = self
            .retrieval
            .retrieve(query, document_scope)
            .await
            .map_err(ChatError::Retrieval)?;

        let sources = self.resolve_sources(&ranked).await?;
        let prompt = self.assembler.assemble(query, &ranked, history);

        let answer = timeout(self.provider_timeout, self.generator.generate(&prompt))
            .await
            .map_err(|_| {
                ChatError::Generation(ProviderError::Timeout(self.provider_timeout.as_secs()))
            })?
            .map_err(ChatError::Generation)?;

        tracing::info!(
            chunks = ranked.len(),
            sources = sources.len(),
            scoped = document_scope.is_some(),
            "answered query"
        );

        Ok(ChatAnswer { answer, sources })
    }

    /// Distinct display names of the cited documents, in rank order of their
    /// best chunk. Empty retrieval yields an empty list.
    async fn resolve_sources(&self, ranked: &[ScoredChunk]) -> Result<Vec<String>, ChatError> {
        let mut sources = Vec::new();
        let mut seen = Vec::new();
        for scored in ranked {
            let document_id = scored.chunk.document_id();
            if seen.contains(&document_id) {
                continue;
            }
            seen.push(document_id);
            match self.documents.find_by_id(document_id).await {
                Ok(Some(document)) => sources.push(document.name().to_string()),
                // A chunk whose document vanished mid-query is skipped, not
                // fatal: delete cascades are handled by the index.
                Ok(None) => {
                    tracing::warn!(%document_id, "chunk references missing document");
                }
                Err(e) => return Err(ChatError::Repository(e)),
            }
        }
        Ok(sources)
    }
}

/// Fallback answer text shown when a provider call fails; never a stack
/// trace.
pub const FALLBACK_ANSWER: &str =
    "I ran into a problem while processing your request. Please try again.";
