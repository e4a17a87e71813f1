pub mod chat_service;
pub mod chunker;
pub mod context_assembler;
pub mod ingestion_service;
pub mod job_registry;
pub mod retrieval_service;

pub use chat_service::{ChatAnswer, ChatError, ChatService};
pub use chunker::{Chunker, ChunkerError};
pub use context_assembler::ContextAssembler;
pub use ingestion_service::{IngestReport, IngestStage, IngestionError, IngestionService};
pub use job_registry::JobRegistry;
pub use retrieval_service::{RetrievalError, RetrievalService};
