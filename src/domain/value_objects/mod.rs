pub mod ingestion_status;
pub mod media_type;

pub use ingestion_status::IngestionStatus;
pub use media_type::MediaType;
