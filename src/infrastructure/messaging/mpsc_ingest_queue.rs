use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::ports::ingest_queue::{IngestQueue, IngestQueueError, IngestTask};

/// Process-local ingest queue over an unbounded tokio channel. The sending
/// half is the queue handed to use cases; the receiving half is consumed by
/// the worker pool.
pub struct MpscIngestQueue {
    sender: mpsc::UnboundedSender<IngestTask>,
}

impl MpscIngestQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<IngestTask>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl IngestQueue for MpscIngestQueue {
    async fn enqueue(&self, task: IngestTask) -> Result<(), IngestQueueError> {
        self.sender
            .send(task)
            .map_err(|_| IngestQueueError::Closed("worker pool has shut down".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::domain::entities::Document;
    use crate::domain::value_objects::MediaType;

    fn task() -> IngestTask {
        IngestTask {
            job_id: Uuid::new_v4(),
            document: Document::new("notes.txt".to_string(), MediaType::PlainText, b"abc"),
            data: b"abc".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_enqueue_delivers_to_receiver() {
        let (queue, mut receiver) = MpscIngestQueue::new();
        let sent = task();
        let job_id = sent.job_id;
        queue.enqueue(sent).await.unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.job_id, job_id);
    }

    #[tokio::test]
    async fn test_enqueue_after_receiver_dropped_fails() {
        let (queue, receiver) = MpscIngestQueue::new();
        drop(receiver);

        let err = queue.enqueue(task()).await.unwrap_err();
        assert!(matches!(err, IngestQueueError::Closed(_)));
    }
}
