use std::sync::Arc;

use uuid::Uuid;

use crate::application::services::job_registry::JobRegistry;
use crate::domain::entities::UploadJob;

#[derive(Debug)]
pub enum JobStatusError {
    NotFound(Uuid),
    NotCancellable(Uuid),
}

impl std::fmt::Display for JobStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatusError::NotFound(id) => write!(f, "Job not found: {}", id),
            JobStatusError::NotCancellable(id) => write!(f, "Job already finished: {}", id),
        }
    }
}

impl std::error::Error for JobStatusError {}

/// Polls and cancels upload jobs. A job that has been disposed after its
/// grace period reports not found, same as one that never existed.
pub struct GetJobStatusUseCase {
    jobs: Arc<JobRegistry>,
}

impl GetJobStatusUseCase {
    pub fn new(jobs: Arc<JobRegistry>) -> Self {
        Self { jobs }
    }

    pub async fn get(&self, job_id: Uuid) -> Result<UploadJob, JobStatusError> {
        self.jobs
            .get(job_id)
            .await
            .ok_or(JobStatusError::NotFound(job_id))
    }

    /// Requests cancellation. The worker observes the flag at its next stage
    /// boundary and rolls back any partially persisted chunks.
    pub async fn cancel(&self, job_id: Uuid) -> Result<(), JobStatusError> {
        if self.jobs.get(job_id).await.is_none() {
            return Err(JobStatusError::NotFound(job_id));
        }
        if !self.jobs.request_cancel(job_id).await {
            return Err(JobStatusError::NotCancellable(job_id));
        }
        tracing::info!(%job_id, "cancellation requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::value_objects::MediaType;

    #[tokio::test]
    async fn test_get_unknown_job() {
        let use_case = GetJobStatusUseCase::new(Arc::new(JobRegistry::new(
            JobRegistry::DEFAULT_GRACE_PERIOD,
        )));
        assert!(matches!(
            use_case.get(Uuid::new_v4()).await,
            Err(JobStatusError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_active_job() {
        let registry = Arc::new(JobRegistry::new(JobRegistry::DEFAULT_GRACE_PERIOD));
        let job = UploadJob::new(
            Uuid::new_v4(),
            "notes.txt".to_string(),
            MediaType::PlainText,
            8,
        );
        let job_id = job.id();
        registry.insert(job).await;

        let use_case = GetJobStatusUseCase::new(registry);
        use_case.cancel(job_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_finished_job_is_rejected() {
        let registry = Arc::new(JobRegistry::new(JobRegistry::DEFAULT_GRACE_PERIOD));
        let job = UploadJob::new(
            Uuid::new_v4(),
            "notes.txt".to_string(),
            MediaType::PlainText,
            8,
        );
        let job_id = job.id();
        registry.insert(job).await;
        registry
            .update(job_id, |job| {
                job.begin_processing().unwrap();
                job.complete().unwrap();
            })
            .await;

        let use_case = GetJobStatusUseCase::new(registry);
        assert!(matches!(
            use_case.cancel(job_id).await,
            Err(JobStatusError::NotCancellable(_))
        ));
    }
}
