use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::text_extractor::{ExtractionError, TextExtractor};
use crate::domain::value_objects::MediaType;

/// Routes an upload to the extractor registered for its media type. Media
/// types the catalog recognizes but no extractor handles are rejected here,
/// before any pipeline work happens.
pub struct CompositeExtractor {
    extractors: Vec<Arc<dyn TextExtractor>>,
}

impl CompositeExtractor {
    pub fn new(extractors: Vec<Arc<dyn TextExtractor>>) -> Self {
        Self { extractors }
    }

    fn find(&self, media_type: MediaType) -> Option<&Arc<dyn TextExtractor>> {
        self.extractors.iter().find(|e| e.can_extract(media_type))
    }
}

#[async_trait]
impl TextExtractor for CompositeExtractor {
    async fn extract(&self, data: &[u8], media_type: MediaType) -> Result<String, ExtractionError> {
        match self.find(media_type) {
            Some(extractor) => extractor.extract(data, media_type).await,
            None => Err(ExtractionError::UnsupportedMediaType(
                media_type.as_mime().to_string(),
            )),
        }
    }

    fn can_extract(&self, media_type: MediaType) -> bool {
        self.find(media_type).is_some()
    }

    fn supported_types(&self) -> Vec<MediaType> {
        let mut types: Vec<MediaType> = self
            .extractors
            .iter()
            .flat_map(|e| e.supported_types())
            .collect();
        types.dedup();
        types
    }
}
