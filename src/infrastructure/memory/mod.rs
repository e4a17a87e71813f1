pub mod in_memory_document_repository;
pub mod in_memory_vector_index;

pub use in_memory_document_repository::InMemoryDocumentRepository;
pub use in_memory_vector_index::InMemoryVectorIndex;
