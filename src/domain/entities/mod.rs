pub mod chunk;
pub mod document;
pub mod message;
pub mod upload_job;

pub use chunk::Chunk;
pub use document::Document;
pub use message::{Message, MessageRole};
pub use upload_job::UploadJob;
