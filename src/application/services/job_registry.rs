use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::UploadJob;

struct JobEntry {
    job: UploadJob,
    cancelled: Arc<AtomicBool>,
}

/// In-process registry of upload jobs. Jobs are ephemeral: they live here
/// for the duration of the upload plus a short grace period after reaching a
/// terminal state (kept only so the caller can acknowledge the outcome),
/// then they are disposed.
pub struct JobRegistry {
    entries: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
    grace_period: Duration,
}

impl JobRegistry {
    pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(60);

    pub fn new(grace_period: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            grace_period,
        }
    }

    pub async fn insert(&self, job: UploadJob) -> Arc<AtomicBool> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut entries = self.entries.write().await;
        entries.insert(
            job.id(),
            JobEntry {
                job,
                cancelled: cancelled.clone(),
            },
        );
        cancelled
    }

    pub async fn get(&self, job_id: Uuid) -> Option<UploadJob> {
        let entries = self.entries.read().await;
        entries.get(&job_id).map(|entry| entry.job.clone())
    }

    pub async fn cancel_flag(&self, job_id: Uuid) -> Option<Arc<AtomicBool>> {
        let entries = self.entries.read().await;
        entries.get(&job_id).map(|entry| entry.cancelled.clone())
    }

    /// Applies a mutation to the stored job. Returns false when the job is
    /// unknown (already disposed or never created).
    pub async fn update<F>(&self, job_id: Uuid, mutate: F) -> bool
    where
        F: FnOnce(&mut UploadJob),
    {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&job_id) {
            Some(entry) => {
                mutate(&mut entry.job);
                true
            }
            None => false,
        }
    }

    /// Requests cancellation of an in-flight job. Terminal jobs cannot be
    /// cancelled. Returns whether a cancellation was requested.
    pub async fn request_cancel(&self, job_id: Uuid) -> bool {
        let entries = self.entries.read().await;
        match entries.get(&job_id) {
            Some(entry) if !entry.job.is_terminal() => {
                entry.cancelled.store(true, Ordering::SeqCst);
                true
            }
            _ => false,
        }
    }

    pub async fn active_count(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|e| !e.job.is_terminal()).count()
    }

    /// Removes the job after the grace period, provided it is terminal by
    /// then. Disposal never touches the persisted document.
    pub fn schedule_disposal(&self, job_id: Uuid) {
        let entries = self.entries.clone();
        let grace = self.grace_period;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let mut entries = entries.write().await;
            if entries.get(&job_id).map(|e| e.job.is_terminal()) == Some(true) {
                entries.remove(&job_id);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::MediaType;

    fn sample_job() -> UploadJob {
        UploadJob::new(
            Uuid::new_v4(),
            "notes.txt".to_string(),
            MediaType::PlainText,
            10,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let registry = JobRegistry::new(Duration::from_secs(60));
        let job = sample_job();
        let job_id = job.id();
        registry.insert(job).await;

        assert!(registry.get(job_id).await.is_some());
        assert!(registry.get(Uuid::new_v4()).await.is_none());
        assert_eq!(registry.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_cancel_sets_shared_flag() {
        let registry = JobRegistry::new(Duration::from_secs(60));
        let job = sample_job();
        let job_id = job.id();
        let flag = registry.insert(job).await;

        assert!(registry.request_cancel(job_id).await);
        assert!(flag.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_terminal_job_cannot_be_cancelled() {
        let registry = JobRegistry::new(Duration::from_secs(60));
        let job = sample_job();
        let job_id = job.id();
        registry.insert(job).await;

        registry
            .update(job_id, |job| {
                job.begin_processing().unwrap();
                job.complete().unwrap();
            })
            .await;

        assert!(!registry.request_cancel(job_id).await);
    }

    #[tokio::test]
    async fn test_disposal_removes_terminal_job_after_grace() {
        let registry = JobRegistry::new(Duration::from_millis(10));
        let job = sample_job();
        let job_id = job.id();
        registry.insert(job).await;
        registry
            .update(job_id, |job| {
                job.begin_processing().unwrap();
                job.complete().unwrap();
            })
            .await;

        registry.schedule_disposal(job_id);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(registry.get(job_id).await.is_none());
    }

    #[tokio::test]
    async fn test_disposal_spares_active_job() {
        let registry = JobRegistry::new(Duration::from_millis(10));
        let job = sample_job();
        let job_id = job.id();
        registry.insert(job).await;

        registry.schedule_disposal(job_id);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(registry.get(job_id).await.is_some());
    }
}
