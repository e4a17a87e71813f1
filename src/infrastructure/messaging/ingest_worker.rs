use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::{Mutex, mpsc};

use crate::application::ports::ingest_queue::IngestTask;
use crate::application::services::ingestion_service::{IngestionError, IngestionService};
use crate::application::services::job_registry::JobRegistry;
use crate::domain::repositories::DocumentRepository;

/// Pool of background workers draining the ingest queue. Workers share one
/// receiver behind a mutex; each task is handled by exactly one worker, and a
/// task failure is confined to its own document and job.
pub struct IngestWorkerPool {
    ingestion: Arc<IngestionService>,
    documents: Arc<dyn DocumentRepository>,
    jobs: Arc<JobRegistry>,
}

impl IngestWorkerPool {
    pub fn new(
        ingestion: Arc<IngestionService>,
        documents: Arc<dyn DocumentRepository>,
        jobs: Arc<JobRegistry>,
    ) -> Self {
        Self {
            ingestion,
            documents,
            jobs,
        }
    }

    pub fn spawn(self: Arc<Self>, workers: usize, receiver: mpsc::UnboundedReceiver<IngestTask>) {
        let receiver = Arc::new(Mutex::new(receiver));
        for worker_id in 0..workers.max(1) {
            let pool = self.clone();
            let receiver = receiver.clone();
            tokio::spawn(async move {
                tracing::debug!(worker_id, "ingest worker started");
                loop {
                    let task = {
                        let mut rx = receiver.lock().await;
                        rx.recv().await
                    };
                    match task {
                        Some(task) => pool.process(task).await,
                        None => {
                            tracing::debug!(worker_id, "ingest queue closed, worker exiting");
                            break;
                        }
                    }
                }
            });
        }
    }

    async fn process(&self, task: IngestTask) {
        let IngestTask {
            job_id,
            mut document,
            data,
        } = task;
        let document_id = document.id();

        let cancelled = self
            .jobs
            .cancel_flag(job_id)
            .await
            .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));

        if let Err(e) = document.begin_processing() {
            tracing::error!(%document_id, error = %e, "document in unexpected state, dropping task");
            return;
        }
        if let Err(e) = self.documents.update(&document).await {
            tracing::error!(%document_id, error = %e, "failed to mark document processing");
            self.finish_failed(job_id, &mut document, "storage unavailable".to_string())
                .await;
            return;
        }
        self.jobs
            .update(job_id, |job| {
                if let Err(e) = job.begin_processing() {
                    tracing::warn!(%job_id, error = %e, "job transition skipped");
                }
            })
            .await;

        // Stage callbacks are synchronous; forward them through a channel so
        // the registry update can await its lock.
        let (stage_tx, mut stage_rx) = mpsc::unbounded_channel();
        let jobs = self.jobs.clone();
        let stage_updater = tokio::spawn(async move {
            while let Some(stage) = stage_rx.recv().await {
                jobs.update(job_id, |job| {
                    let _ = job.set_stage(stage);
                })
                .await;
            }
        });

        let result = self
            .ingestion
            .ingest(&document, &data, &cancelled, |stage| {
                let _ = stage_tx.send(stage.describe());
            })
            .await;
        drop(stage_tx);
        let _ = stage_updater.await;

        match result {
            Ok(report) => {
                if let Err(e) = document.complete() {
                    tracing::error!(%document_id, error = %e, "completed document failed to transition");
                }
                if let Err(e) = self.documents.update(&document).await {
                    tracing::error!(%document_id, error = %e, "failed to persist completed status");
                }
                self.jobs
                    .update(job_id, |job| {
                        let _ = job.complete();
                    })
                    .await;
                tracing::info!(
                    %job_id,
                    %document_id,
                    chunks = report.chunks_created,
                    "upload finished"
                );
            }
            Err(IngestionError::Cancelled) => {
                self.finish_failed(job_id, &mut document, "cancelled by client".to_string())
                    .await;
                tracing::info!(%job_id, %document_id, "upload cancelled");
            }
            Err(e) => {
                self.finish_failed(job_id, &mut document, e.to_string()).await;
                tracing::error!(%job_id, %document_id, error = %e, "upload failed");
            }
        }
        self.jobs.schedule_disposal(job_id);
    }

    async fn finish_failed(
        &self,
        job_id: uuid::Uuid,
        document: &mut crate::domain::entities::Document,
        cause: String,
    ) {
        if document.fail(cause.clone()).is_ok() {
            if let Err(e) = self.documents.update(document).await {
                tracing::error!(document_id = %document.id(), error = %e, "failed to persist error status");
            }
        }
        self.jobs
            .update(job_id, |job| {
                let _ = job.fail(cause.clone());
            })
            .await;
    }
}
