use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::embedding_provider::EmbeddingProvider;
use crate::application::ports::ingest_queue::IngestQueue;
use crate::application::ports::response_generator::ResponseGenerator;
use crate::application::ports::text_extractor::TextExtractor;
use crate::application::services::chat_service::ChatService;
use crate::application::services::chunker::{Chunker, ChunkerError};
use crate::application::services::context_assembler::ContextAssembler;
use crate::application::services::ingestion_service::IngestionService;
use crate::application::services::job_registry::JobRegistry;
use crate::application::services::retrieval_service::RetrievalService;
use crate::application::use_cases::{
    AskQuestionUseCase, DeleteDocumentUseCase, GetJobStatusUseCase, ListDocumentsUseCase,
    UploadDocumentUseCase,
};
use crate::config::{AppConfig, Provider, StorageBackend};
use crate::domain::repositories::{DocumentRepository, VectorIndex};
use crate::infrastructure::database::{self, DatabaseError, PgDocumentRepository, PgVectorIndex};
use crate::infrastructure::external_services::{
    CompositeExtractor, GeminiClient, OpenAiClient, PdfExtractor, PlainTextExtractor,
};
use crate::infrastructure::memory::{InMemoryDocumentRepository, InMemoryVectorIndex};
use crate::infrastructure::messaging::{IngestWorkerPool, MpscIngestQueue};

#[derive(Debug)]
pub enum ContainerError {
    Provider(String),
    Database(DatabaseError),
    Chunker(ChunkerError),
}

impl std::fmt::Display for ContainerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerError::Provider(msg) => write!(f, "Provider setup failed: {}", msg),
            ContainerError::Database(e) => write!(f, "Database setup failed: {}", e),
            ContainerError::Chunker(e) => write!(f, "Chunker setup failed: {}", e),
        }
    }
}

impl std::error::Error for ContainerError {}

/// Wires configuration into the object graph and spawns the background
/// workers. Built once at startup; handlers share it behind an `Arc`.
pub struct AppContainer {
    pub config: AppConfig,
    pub upload_document: Arc<UploadDocumentUseCase>,
    pub ask_question: Arc<AskQuestionUseCase>,
    pub list_documents: Arc<ListDocumentsUseCase>,
    pub delete_document: Arc<DeleteDocumentUseCase>,
    pub job_status: Arc<GetJobStatusUseCase>,
}

impl AppContainer {
    pub fn build(config: AppConfig) -> Result<Self, ContainerError> {
        let (embedder, generator) = build_providers(&config)?;
        // A generation-only backend wired as the embedder is a deployment
        // error; refuse to start instead of failing every upload.
        if !embedder.supports_embedding() {
            let (model, _) = embedder.model_info();
            return Err(ContainerError::Provider(format!(
                "configured embedding backend '{}' cannot produce embeddings",
                model
            )));
        }
        let dimension = embedder.dimension();

        let (documents, vector_index): (Arc<dyn DocumentRepository>, Arc<dyn VectorIndex>) =
            match config.storage_backend {
                StorageBackend::Memory => (
                    Arc::new(InMemoryDocumentRepository::new()),
                    Arc::new(InMemoryVectorIndex::new(dimension)),
                ),
                StorageBackend::Postgres => {
                    let url = config
                        .database_url
                        .as_deref()
                        .expect("checked during config parsing");
                    let pool = database::create_pool(url, config.db_pool_size)
                        .map_err(ContainerError::Database)?;
                    database::run_migrations(&pool).map_err(ContainerError::Database)?;
                    (
                        Arc::new(PgDocumentRepository::new(pool.clone())),
                        Arc::new(PgVectorIndex::new(pool, dimension)),
                    )
                }
            };

        let extractor: Arc<dyn TextExtractor> = Arc::new(CompositeExtractor::new(vec![
            Arc::new(PdfExtractor),
            Arc::new(PlainTextExtractor),
        ]));

        let provider_timeout = Duration::from_secs(config.provider_timeout_secs);
        let chunker = Chunker::new(config.chunk_size, config.chunk_overlap)
            .map_err(ContainerError::Chunker)?;

        let ingestion = Arc::new(IngestionService::new(
            extractor.clone(),
            embedder.clone(),
            vector_index.clone(),
            chunker,
            config.embed_concurrency,
            provider_timeout,
        ));
        let retrieval = Arc::new(RetrievalService::new(
            embedder,
            vector_index.clone(),
            config.similarity_threshold,
            config.search_top_k,
            provider_timeout,
        ));
        let assembler = ContextAssembler::new(config.max_history, config.max_prompt_chars);
        let chat = Arc::new(ChatService::new(
            retrieval,
            generator,
            documents.clone(),
            assembler,
            provider_timeout,
        ));

        let jobs = Arc::new(JobRegistry::new(JobRegistry::DEFAULT_GRACE_PERIOD));
        let (queue, receiver) = MpscIngestQueue::new();
        let queue: Arc<dyn IngestQueue> = Arc::new(queue);
        Arc::new(IngestWorkerPool::new(
            ingestion,
            documents.clone(),
            jobs.clone(),
        ))
        .spawn(config.ingest_workers, receiver);

        Ok(Self {
            upload_document: Arc::new(UploadDocumentUseCase::new(
                documents.clone(),
                extractor,
                queue,
                jobs.clone(),
                config.max_upload_bytes,
            )),
            ask_question: Arc::new(AskQuestionUseCase::new(chat, documents.clone())),
            list_documents: Arc::new(ListDocumentsUseCase::new(documents.clone())),
            delete_document: Arc::new(DeleteDocumentUseCase::new(documents, vector_index)),
            job_status: Arc::new(GetJobStatusUseCase::new(jobs)),
            config,
        })
    }
}

fn build_providers(
    config: &AppConfig,
) -> Result<(Arc<dyn EmbeddingProvider>, Arc<dyn ResponseGenerator>), ContainerError> {
    // One shared client per vendor so both capabilities reuse its
    // connection pool.
    let openai: Option<Arc<OpenAiClient>> = if config.embedding_provider == Provider::OpenAi
        || config.generation_provider == Provider::OpenAi
    {
        Some(Arc::new(
            OpenAiClient::from_env().map_err(|e| ContainerError::Provider(e.to_string()))?,
        ))
    } else {
        None
    };
    let gemini: Option<Arc<GeminiClient>> = if config.embedding_provider == Provider::Gemini
        || config.generation_provider == Provider::Gemini
    {
        Some(Arc::new(
            GeminiClient::from_env().map_err(|e| ContainerError::Provider(e.to_string()))?,
        ))
    } else {
        None
    };

    let embedder: Arc<dyn EmbeddingProvider> = match config.embedding_provider {
        Provider::OpenAi => openai.clone().expect("constructed above"),
        Provider::Gemini => gemini.clone().expect("constructed above"),
    };
    let generator: Arc<dyn ResponseGenerator> = match config.generation_provider {
        Provider::OpenAi => openai.expect("constructed above"),
        Provider::Gemini => gemini.expect("constructed above"),
    };

    Ok((embedder, generator))
}
