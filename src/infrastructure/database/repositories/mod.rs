pub mod pg_document_repository;
pub mod pg_vector_index;

pub use pg_document_repository::PgDocumentRepository;
pub use pg_vector_index::PgVectorIndex;
