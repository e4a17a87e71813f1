pub mod ask_question;
pub mod delete_document;
pub mod get_job_status;
pub mod list_documents;
pub mod upload_document;

pub use ask_question::{AskQuestionError, AskQuestionRequest, AskQuestionUseCase, HistoryEntry};
pub use delete_document::{DeleteDocumentError, DeleteDocumentUseCase};
pub use get_job_status::{GetJobStatusUseCase, JobStatusError};
pub use list_documents::ListDocumentsUseCase;
pub use upload_document::{
    UploadDocumentError, UploadDocumentRequest, UploadDocumentResponse, UploadDocumentUseCase,
};
