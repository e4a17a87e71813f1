use std::sync::Arc;

use uuid::Uuid;

use crate::application::ports::ingest_queue::{IngestQueue, IngestQueueError, IngestTask};
use crate::application::ports::text_extractor::TextExtractor;
use crate::application::services::job_registry::JobRegistry;
use crate::domain::entities::{Document, UploadJob};
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};
use crate::domain::value_objects::MediaType;

#[derive(Debug)]
pub enum UploadDocumentError {
    UnsupportedMediaType(String),
    EmptyFileName,
    FileTooLarge { size_bytes: usize, max_bytes: usize },
    Repository(DocumentRepositoryError),
    Queue(IngestQueueError),
}

impl std::fmt::Display for UploadDocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadDocumentError::UnsupportedMediaType(mime) => {
                write!(f, "Unsupported media type: {}", mime)
            }
            UploadDocumentError::EmptyFileName => write!(f, "File name cannot be empty"),
            UploadDocumentError::FileTooLarge {
                size_bytes,
                max_bytes,
            } => write!(
                f,
                "File of {} bytes exceeds the {} byte limit",
                size_bytes, max_bytes
            ),
            UploadDocumentError::Repository(e) => write!(f, "Failed to store document: {}", e),
            UploadDocumentError::Queue(e) => write!(f, "Failed to queue document: {}", e),
        }
    }
}

impl std::error::Error for UploadDocumentError {}

#[derive(Debug, Clone)]
pub struct UploadDocumentRequest {
    pub file_name: String,
    pub declared_media_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadDocumentResponse {
    pub job_id: Uuid,
    pub document_id: Uuid,
    pub file_name: String,
    pub media_type: MediaType,
    pub size_bytes: i64,
}

/// Accepts an upload: validates the declared media type and size, persists
/// the document record in its initial state, registers a job, and hands the
/// bytes to the background workers. Returns immediately; processing is
/// tracked through the job.
pub struct UploadDocumentUseCase {
    documents: Arc<dyn DocumentRepository>,
    extractor: Arc<dyn TextExtractor>,
    queue: Arc<dyn IngestQueue>,
    jobs: Arc<JobRegistry>,
    max_upload_bytes: usize,
}

impl UploadDocumentUseCase {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        extractor: Arc<dyn TextExtractor>,
        queue: Arc<dyn IngestQueue>,
        jobs: Arc<JobRegistry>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            documents,
            extractor,
            queue,
            jobs,
            max_upload_bytes,
        }
    }

    pub async fn execute(
        &self,
        request: UploadDocumentRequest,
    ) -> Result<UploadDocumentResponse, UploadDocumentError> {
        let file_name = request.file_name.trim();
        if file_name.is_empty() {
            return Err(UploadDocumentError::EmptyFileName);
        }

        let media_type = MediaType::from_mime(&request.declared_media_type).ok_or_else(|| {
            UploadDocumentError::UnsupportedMediaType(request.declared_media_type.clone())
        })?;
        // A recognized media type without a registered extractor is rejected
        // up front rather than failing later in the pipeline.
        if !self.extractor.can_extract(media_type) {
            return Err(UploadDocumentError::UnsupportedMediaType(
                request.declared_media_type.clone(),
            ));
        }

        if request.data.len() > self.max_upload_bytes {
            return Err(UploadDocumentError::FileTooLarge {
                size_bytes: request.data.len(),
                max_bytes: self.max_upload_bytes,
            });
        }

        let document = Document::new(file_name.to_string(), media_type, &request.data);
        self.documents
            .save(&document)
            .await
            .map_err(UploadDocumentError::Repository)?;

        let mut job = UploadJob::new(
            document.id(),
            file_name.to_string(),
            media_type,
            document.size_bytes(),
        );
        // The full byte stream is in hand once we reach this point.
        job.update_progress(100)
            .map_err(|e| UploadDocumentError::Queue(IngestQueueError::Closed(e)))?;
        let job_id = job.id();
        let response = UploadDocumentResponse {
            job_id,
            document_id: document.id(),
            file_name: file_name.to_string(),
            media_type,
            size_bytes: document.size_bytes(),
        };
        self.jobs.insert(job).await;

        tracing::info!(
            %job_id,
            document_id = %document.id(),
            media_type = %media_type,
            size_bytes = document.size_bytes(),
            "accepted upload"
        );

        self.queue
            .enqueue(IngestTask {
                job_id,
                document,
                data: request.data,
            })
            .await
            .map_err(UploadDocumentError::Queue)?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::application::ports::text_extractor::ExtractionError;
    use crate::infrastructure::memory::InMemoryDocumentRepository;

    struct RecordingQueue {
        tasks: Mutex<Vec<IngestTask>>,
    }

    #[async_trait]
    impl IngestQueue for RecordingQueue {
        async fn enqueue(&self, task: IngestTask) -> Result<(), IngestQueueError> {
            self.tasks.lock().await.push(task);
            Ok(())
        }
    }

    struct TextOnlyExtractor;

    #[async_trait]
    impl TextExtractor for TextOnlyExtractor {
        async fn extract(
            &self,
            data: &[u8],
            _media_type: MediaType,
        ) -> Result<String, ExtractionError> {
            Ok(String::from_utf8_lossy(data).into_owned())
        }

        fn can_extract(&self, media_type: MediaType) -> bool {
            media_type == MediaType::PlainText
        }

        fn supported_types(&self) -> Vec<MediaType> {
            vec![MediaType::PlainText]
        }
    }

    fn use_case(max_bytes: usize) -> (UploadDocumentUseCase, Arc<RecordingQueue>) {
        let queue = Arc::new(RecordingQueue {
            tasks: Mutex::new(Vec::new()),
        });
        let use_case = UploadDocumentUseCase::new(
            Arc::new(InMemoryDocumentRepository::new()),
            Arc::new(TextOnlyExtractor),
            queue.clone(),
            Arc::new(JobRegistry::new(JobRegistry::DEFAULT_GRACE_PERIOD)),
            max_bytes,
        );
        (use_case, queue)
    }

    fn text_request(data: &[u8]) -> UploadDocumentRequest {
        UploadDocumentRequest {
            file_name: "notes.txt".to_string(),
            declared_media_type: "text/plain".to_string(),
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_accepts_and_enqueues_valid_upload() {
        let (use_case, queue) = use_case(1024);
        let response = use_case.execute(text_request(b"hello")).await.unwrap();

        assert_eq!(response.media_type, MediaType::PlainText);
        assert_eq!(response.size_bytes, 5);

        let tasks = queue.tasks.lock().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].job_id, response.job_id);
        assert_eq!(tasks[0].document.id(), response.document_id);
    }

    #[tokio::test]
    async fn test_rejects_unknown_mime() {
        let (use_case, _) = use_case(1024);
        let mut request = text_request(b"hello");
        request.declared_media_type = "image/png".to_string();

        let err = use_case.execute(request).await.unwrap_err();
        assert!(matches!(err, UploadDocumentError::UnsupportedMediaType(_)));
    }

    #[tokio::test]
    async fn test_rejects_recognized_type_without_extractor() {
        let (use_case, _) = use_case(1024);
        let mut request = text_request(b"%PDF-1.4");
        request.declared_media_type = "application/pdf".to_string();

        let err = use_case.execute(request).await.unwrap_err();
        assert!(matches!(err, UploadDocumentError::UnsupportedMediaType(_)));
    }

    #[tokio::test]
    async fn test_rejects_oversized_upload() {
        let (use_case, queue) = use_case(4);
        let err = use_case.execute(text_request(b"hello")).await.unwrap_err();

        assert!(matches!(err, UploadDocumentError::FileTooLarge { .. }));
        assert!(queue.tasks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_blank_file_name() {
        let (use_case, _) = use_case(1024);
        let mut request = text_request(b"hello");
        request.file_name = "   ".to_string();

        let err = use_case.execute(request).await.unwrap_err();
        assert!(matches!(err, UploadDocumentError::EmptyFileName));
    }
}
