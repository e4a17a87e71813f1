use async_trait::async_trait;

use crate::domain::value_objects::MediaType;

#[derive(Debug)]
pub enum ExtractionError {
    UnsupportedMediaType(String),
    ExtractionFailed(String),
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionError::UnsupportedMediaType(mime) => {
                write!(f, "Unsupported media type: {}", mime)
            }
            ExtractionError::ExtractionFailed(msg) => write!(f, "Extraction failed: {}", msg),
        }
    }
}

impl std::error::Error for ExtractionError {}

/// Turns raw uploaded bytes into plain text. The pipeline treats this as an
/// opaque collaborator and never inspects binary formats itself.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, data: &[u8], media_type: MediaType) -> Result<String, ExtractionError>;

    fn can_extract(&self, media_type: MediaType) -> bool;

    fn supported_types(&self) -> Vec<MediaType>;
}
