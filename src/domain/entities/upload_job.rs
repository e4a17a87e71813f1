use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{IngestionStatus, MediaType};

/// Per-upload lifecycle coordinator: `uploading -> processing -> {completed |
/// error}`. Ephemeral; lives only in the in-process job registry and is
/// disposed after a grace period once terminal. A failed upload is never
/// retried in place, re-uploading creates a brand-new job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadJob {
    id: Uuid,
    document_id: Uuid,
    file_name: String,
    media_type: MediaType,
    size_bytes: i64,
    status: IngestionStatus,
    progress: u8,
    stage: Option<String>,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl UploadJob {
    pub fn new(document_id: Uuid, file_name: String, media_type: MediaType, size_bytes: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            file_name,
            media_type,
            size_bytes,
            status: IngestionStatus::Uploading,
            progress: 0,
            stage: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn size_bytes(&self) -> i64 {
        self.size_bytes
    }

    pub fn status(&self) -> &IngestionStatus {
        &self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Upload progress is a monotonically non-decreasing percentage; a lower
    /// value than the current one is rejected.
    pub fn update_progress(&mut self, progress: u8) -> Result<(), String> {
        if !self.status.is_uploading() {
            return Err("job is not uploading".to_string());
        }
        if progress > 100 {
            return Err("progress must be between 0 and 100".to_string());
        }
        if progress < self.progress {
            return Err(format!(
                "progress may not decrease ({} -> {})",
                self.progress, progress
            ));
        }
        self.progress = progress;
        Ok(())
    }

    /// Transitions to `processing` once the full byte stream has been
    /// received.
    pub fn begin_processing(&mut self) -> Result<(), String> {
        if !self.status.is_uploading() {
            return Err(format!("job is not uploading: {}", self.status));
        }
        self.progress = 100;
        self.status = IngestionStatus::Processing;
        Ok(())
    }

    pub fn set_stage(&mut self, stage: &str) -> Result<(), String> {
        if !self.status.is_processing() {
            return Err("job is not processing".to_string());
        }
        self.stage = Some(stage.to_string());
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), String> {
        if !self.status.is_processing() {
            return Err(format!("job is not processing: {}", self.status));
        }
        self.status = IngestionStatus::Completed;
        self.stage = None;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn fail(&mut self, cause: String) -> Result<(), String> {
        if self.status.is_terminal() {
            return Err("job already finished".to_string());
        }
        self.status = IngestionStatus::Error(cause);
        self.finished_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UploadJob {
        UploadJob::new(
            Uuid::new_v4(),
            "notes.txt".to_string(),
            MediaType::PlainText,
            42,
        )
    }

    #[test]
    fn test_new_job_is_uploading() {
        let job = sample();
        assert_eq!(job.status(), &IngestionStatus::Uploading);
        assert_eq!(job.progress(), 0);
        assert!(!job.is_terminal());
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut job = sample();
        job.update_progress(40).unwrap();
        job.update_progress(40).unwrap();
        job.update_progress(90).unwrap();
        assert!(job.update_progress(50).is_err());
        assert!(job.update_progress(101).is_err());
        assert_eq!(job.progress(), 90);
    }

    #[test]
    fn test_happy_path() {
        let mut job = sample();
        job.update_progress(100).unwrap();
        job.begin_processing().unwrap();
        job.set_stage("embedding chunks").unwrap();
        assert_eq!(job.stage(), Some("embedding chunks"));
        job.complete().unwrap();
        assert!(job.is_terminal());
        assert!(job.finished_at().is_some());
    }

    #[test]
    fn test_failure_from_either_active_state() {
        let mut uploading = sample();
        assert!(uploading.fail("client disconnected".to_string()).is_ok());

        let mut processing = sample();
        processing.begin_processing().unwrap();
        assert!(processing.fail("embedding failed".to_string()).is_ok());
    }

    #[test]
    fn test_terminal_rejects_further_transitions() {
        let mut job = sample();
        job.begin_processing().unwrap();
        job.complete().unwrap();
        assert!(job.fail("too late".to_string()).is_err());
        assert!(job.begin_processing().is_err());
        assert!(job.update_progress(100).is_err());
    }

    #[test]
    fn test_cannot_complete_while_uploading() {
        let mut job = sample();
        assert!(job.complete().is_err());
    }
}
