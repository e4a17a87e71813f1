use std::sync::Arc;

use uuid::Uuid;

use crate::application::services::chat_service::{ChatAnswer, ChatError, ChatService};
use crate::domain::entities::{Message, MessageRole};
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};

#[derive(Debug)]
pub enum AskQuestionError {
    EmptyQuery,
    InvalidRole(String),
    DocumentNotFound(Uuid),
    Chat(ChatError),
    Repository(DocumentRepositoryError),
}

impl std::fmt::Display for AskQuestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AskQuestionError::EmptyQuery => write!(f, "Query cannot be empty"),
            AskQuestionError::InvalidRole(role) => write!(f, "Unknown message role: {}", role),
            AskQuestionError::DocumentNotFound(id) => write!(f, "Document not found: {}", id),
            AskQuestionError::Chat(e) => write!(f, "{}", e),
            AskQuestionError::Repository(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AskQuestionError {}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct AskQuestionRequest {
    pub query: String,
    pub document_id: Option<Uuid>,
    pub history: Vec<HistoryEntry>,
}

/// Answers one question over the ingested corpus, optionally scoped to a
/// single document. Rejects scopes that point at unknown documents before
/// any provider call is made.
pub struct AskQuestionUseCase {
    chat: Arc<ChatService>,
    documents: Arc<dyn DocumentRepository>,
}

impl AskQuestionUseCase {
    pub fn new(chat: Arc<ChatService>, documents: Arc<dyn DocumentRepository>) -> Self {
        Self { chat, documents }
    }

    pub async fn execute(
        &self,
        request: AskQuestionRequest,
    ) -> Result<ChatAnswer, AskQuestionError> {
        if request.query.trim().is_empty() {
            return Err(AskQuestionError::EmptyQuery);
        }

        if let Some(document_id) = request.document_id {
            let found = self
                .documents
                .find_by_id(document_id)
                .await
                .map_err(AskQuestionError::Repository)?;
            if found.is_none() {
                return Err(AskQuestionError::DocumentNotFound(document_id));
            }
        }

        let history = request
            .history
            .iter()
            .map(|entry| {
                let role = MessageRole::parse(&entry.role)
                    .map_err(|_| AskQuestionError::InvalidRole(entry.role.clone()))?;
                Ok(Message::new(role, entry.content.clone()))
            })
            .collect::<Result<Vec<_>, AskQuestionError>>()?;

        self.chat
            .answer(&request.query, request.document_id, &history)
            .await
            .map_err(AskQuestionError::Chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use pgvector::Vector;

    use crate::application::ports::embedding_provider::{EmbeddingProvider, ProviderError};
    use crate::application::ports::response_generator::{Prompt, ResponseGenerator};
    use crate::application::services::context_assembler::ContextAssembler;
    use crate::application::services::retrieval_service::RetrievalService;
    use crate::infrastructure::memory::{InMemoryDocumentRepository, InMemoryVectorIndex};

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vector, ProviderError> {
            Ok(Vector::from(vec![1.0, 0.0]))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError> {
            Ok(texts.iter().map(|_| Vector::from(vec![1.0, 0.0])).collect())
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_info(&self) -> (String, Option<String>) {
            ("fixed".to_string(), None)
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl ResponseGenerator for EchoGenerator {
        async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError> {
            Ok(format!("answer to: {}", prompt.question))
        }
    }

    fn use_case() -> AskQuestionUseCase {
        let documents: Arc<dyn DocumentRepository> = Arc::new(InMemoryDocumentRepository::new());
        let retrieval = Arc::new(RetrievalService::new(
            Arc::new(FixedEmbedder),
            Arc::new(InMemoryVectorIndex::new(2)),
            0.7,
            5,
            Duration::from_secs(5),
        ));
        let chat = Arc::new(ChatService::new(
            retrieval,
            Arc::new(EchoGenerator),
            documents.clone(),
            ContextAssembler::default(),
            Duration::from_secs(5),
        ));
        AskQuestionUseCase::new(chat, documents)
    }

    #[tokio::test]
    async fn test_answers_with_empty_corpus() {
        let use_case = use_case();
        let answer = use_case
            .execute(AskQuestionRequest {
                query: "what is in the report?".to_string(),
                document_id: None,
                history: Vec::new(),
            })
            .await
            .unwrap();

        assert_eq!(answer.answer, "answer to: what is in the report?");
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_blank_query() {
        let use_case = use_case();
        let err = use_case
            .execute(AskQuestionRequest {
                query: "  ".to_string(),
                document_id: None,
                history: Vec::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AskQuestionError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_rejects_unknown_document_scope() {
        let use_case = use_case();
        let missing = Uuid::new_v4();
        let err = use_case
            .execute(AskQuestionRequest {
                query: "anything".to_string(),
                document_id: Some(missing),
                history: Vec::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AskQuestionError::DocumentNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_rejects_unknown_history_role() {
        let use_case = use_case();
        let err = use_case
            .execute(AskQuestionRequest {
                query: "anything".to_string(),
                document_id: None,
                history: vec![HistoryEntry {
                    role: "system".to_string(),
                    content: "sneaky".to_string(),
                }],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AskQuestionError::InvalidRole(_)));
    }
}
