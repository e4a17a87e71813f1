use async_trait::async_trait;

use crate::application::ports::text_extractor::{ExtractionError, TextExtractor};
use crate::domain::value_objects::MediaType;

/// Decodes plain text uploads. Strict UTF-8: bytes that do not decode are an
/// extraction failure rather than silently replaced.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, data: &[u8], media_type: MediaType) -> Result<String, ExtractionError> {
        if media_type != MediaType::PlainText {
            return Err(ExtractionError::UnsupportedMediaType(
                media_type.as_mime().to_string(),
            ));
        }
        String::from_utf8(data.to_vec())
            .map_err(|e| ExtractionError::ExtractionFailed(format!("invalid UTF-8: {}", e)))
    }

    fn can_extract(&self, media_type: MediaType) -> bool {
        media_type == MediaType::PlainText
    }

    fn supported_types(&self) -> Vec<MediaType> {
        vec![MediaType::PlainText]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_decodes_utf8() {
        let text = PlainTextExtractor
            .extract("héllo wörld".as_bytes(), MediaType::PlainText)
            .await
            .unwrap();
        assert_eq!(text, "héllo wörld");
    }

    #[tokio::test]
    async fn test_rejects_invalid_utf8() {
        let err = PlainTextExtractor
            .extract(&[0xff, 0xfe, 0x80], MediaType::PlainText)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(_)));
    }
}
