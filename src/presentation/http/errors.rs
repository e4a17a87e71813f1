use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::services::chat_service::{self, ChatError};
use crate::application::use_cases::{
    AskQuestionError, DeleteDocumentError, JobStatusError, UploadDocumentError,
};
use crate::domain::repositories::DocumentRepositoryError;
use crate::presentation::http::dto::ApiResponse;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge(String),
    UnsupportedMediaType(String),
    Conflict(String),
    Upstream(String),
    Internal(String),
}

impl ApiError {
    fn parts(self) -> (StatusCode, String, bool) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, false),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, false),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg, false),
            ApiError::UnsupportedMediaType(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg, false)
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, false),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg, true),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, false),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, retryable) = self.parts();
        if status.is_server_error() {
            tracing::error!(%status, message, "request failed");
        }
        (
            status,
            Json(ApiResponse::<()>::error(message, retryable)),
        )
            .into_response()
    }
}

impl From<UploadDocumentError> for ApiError {
    fn from(e: UploadDocumentError) -> Self {
        match e {
            UploadDocumentError::UnsupportedMediaType(mime) => {
                ApiError::UnsupportedMediaType(format!("Unsupported media type: {}", mime))
            }
            UploadDocumentError::EmptyFileName => {
                ApiError::BadRequest("File name cannot be empty".to_string())
            }
            UploadDocumentError::FileTooLarge { .. } => ApiError::PayloadTooLarge(e.to_string()),
            UploadDocumentError::Repository(e) => ApiError::Internal(e.to_string()),
            UploadDocumentError::Queue(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AskQuestionError> for ApiError {
    fn from(e: AskQuestionError) -> Self {
        match e {
            AskQuestionError::EmptyQuery => {
                ApiError::BadRequest("Query cannot be empty".to_string())
            }
            AskQuestionError::InvalidRole(role) => {
                ApiError::BadRequest(format!("Unknown message role: {}", role))
            }
            AskQuestionError::DocumentNotFound(id) => {
                ApiError::NotFound(format!("Document not found: {}", id))
            }
            AskQuestionError::Chat(ChatError::EmptyQuery) => {
                ApiError::BadRequest("Query cannot be empty".to_string())
            }
            // Provider failures surface as one retryable error with a
            // friendly message, never a stack trace.
            AskQuestionError::Chat(e) if e.is_retryable() => {
                tracing::error!(error = %e, "chat request failed upstream");
                ApiError::Upstream(chat_service::FALLBACK_ANSWER.to_string())
            }
            AskQuestionError::Chat(e) => ApiError::Internal(e.to_string()),
            AskQuestionError::Repository(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DeleteDocumentError> for ApiError {
    fn from(e: DeleteDocumentError) -> Self {
        match e {
            DeleteDocumentError::NotFound(id) => {
                ApiError::NotFound(format!("Document not found: {}", id))
            }
            DeleteDocumentError::Index(e) => ApiError::Internal(e.to_string()),
            DeleteDocumentError::Repository(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JobStatusError> for ApiError {
    fn from(e: JobStatusError) -> Self {
        match e {
            JobStatusError::NotFound(id) => ApiError::NotFound(format!("Job not found: {}", id)),
            JobStatusError::NotCancellable(id) => {
                ApiError::Conflict(format!("Job already finished: {}", id))
            }
        }
    }
}

impl From<DocumentRepositoryError> for ApiError {
    fn from(e: DocumentRepositoryError) -> Self {
        match e {
            DocumentRepositoryError::NotFound(id) => {
                ApiError::NotFound(format!("Document not found: {}", id))
            }
            DocumentRepositoryError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}
