use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::UploadJob;

#[derive(Debug, Serialize)]
pub struct JobDto {
    pub id: Uuid,
    pub document_id: Uuid,
    pub file_name: String,
    pub status: String,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<&UploadJob> for JobDto {
    fn from(job: &UploadJob) -> Self {
        Self {
            id: job.id(),
            document_id: job.document_id(),
            file_name: job.file_name().to_string(),
            status: job.status().as_str().to_string(),
            progress: job.progress(),
            stage: job.stage().map(|s| s.to_string()),
            error: job.status().error_message().map(|s| s.to_string()),
            created_at: job.created_at(),
            finished_at: job.finished_at(),
        }
    }
}
