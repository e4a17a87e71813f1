use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Document;

#[derive(Debug)]
pub enum IngestQueueError {
    Closed(String),
}

impl std::fmt::Display for IngestQueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestQueueError::Closed(msg) => write!(f, "Ingest queue closed: {}", msg),
        }
    }
}

impl std::error::Error for IngestQueueError {}

/// One accepted upload waiting to be processed: the document record plus the
/// raw bytes it was created from.
#[derive(Debug)]
pub struct IngestTask {
    pub job_id: Uuid,
    pub document: Document,
    pub data: Vec<u8>,
}

/// Hands accepted uploads to the background workers. Each task is processed
/// independently; one task's failure never affects its siblings.
#[async_trait]
pub trait IngestQueue: Send + Sync {
    async fn enqueue(&self, task: IngestTask) -> Result<(), IngestQueueError>;
}
