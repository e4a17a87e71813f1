use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::application::use_cases::UploadDocumentResponse;
use crate::domain::entities::Document;

#[derive(Debug, Serialize)]
pub struct DocumentDto {
    pub id: Uuid,
    pub name: String,
    pub media_type: String,
    pub size_bytes: i64,
    pub content_hash: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for DocumentDto {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id(),
            name: document.name().to_string(),
            media_type: document.media_type().as_mime().to_string(),
            size_bytes: document.size_bytes(),
            content_hash: document.content_hash().to_string(),
            status: document.status().as_str().to_string(),
            error: document.status().error_message().map(|s| s.to_string()),
            uploaded_at: document.uploaded_at(),
            updated_at: document.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadAcceptedDto {
    pub job_id: Uuid,
    pub document_id: Uuid,
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: i64,
}

impl From<UploadDocumentResponse> for UploadAcceptedDto {
    fn from(response: UploadDocumentResponse) -> Self {
        Self {
            job_id: response.job_id,
            document_id: response.document_id,
            file_name: response.file_name,
            media_type: response.media_type.as_mime().to_string(),
            size_bytes: response.size_bytes,
        }
    }
}
