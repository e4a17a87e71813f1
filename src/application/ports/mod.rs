pub mod embedding_provider;
pub mod ingest_queue;
pub mod response_generator;
pub mod text_extractor;

pub use embedding_provider::{EmbeddingProvider, ProviderError};
pub use ingest_queue::{IngestQueue, IngestQueueError, IngestTask};
pub use response_generator::{Prompt, PromptContext, PromptMessage, PromptTurn, ResponseGenerator};
pub use text_extractor::{ExtractionError, TextExtractor};
