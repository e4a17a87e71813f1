pub mod chat_handler;
pub mod document_handler;
pub mod job_handler;
