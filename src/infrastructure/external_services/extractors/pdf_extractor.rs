use async_trait::async_trait;
use lopdf::Document;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::application::ports::text_extractor::{ExtractionError, TextExtractor};
use crate::domain::value_objects::MediaType;

/// Extracts text from PDF bytes with lopdf, one page per rayon task. Pages
/// are reassembled in page-number order, so the output is deterministic
/// regardless of which page finishes first.
pub struct PdfExtractor;

impl PdfExtractor {
    fn extract_sync(data: &[u8]) -> Result<String, ExtractionError> {
        let doc = Document::load_mem(data)
            .map_err(|e| ExtractionError::ExtractionFailed(format!("invalid PDF: {}", e)))?;

        if doc.is_encrypted() {
            return Err(ExtractionError::ExtractionFailed(
                "encrypted PDFs are not supported".to_string(),
            ));
        }

        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut extracted: Vec<(u32, String)> = pages
            .into_par_iter()
            .map(|page_num| {
                let text = doc.extract_text(&[page_num]).map_err(|e| {
                    ExtractionError::ExtractionFailed(format!(
                        "failed to extract page {}: {}",
                        page_num, e
                    ))
                })?;
                let lines: Vec<String> = text
                    .split('\n')
                    .map(|s| s.trim_end().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                Ok((page_num, lines.join("\n")))
            })
            .collect::<Result<Vec<_>, ExtractionError>>()?;

        extracted.sort_by_key(|(page_num, _)| *page_num);
        Ok(extracted
            .into_iter()
            .map(|(_, page_text)| page_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, data: &[u8], media_type: MediaType) -> Result<String, ExtractionError> {
        if media_type != MediaType::Pdf {
            return Err(ExtractionError::UnsupportedMediaType(
                media_type.as_mime().to_string(),
            ));
        }
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || Self::extract_sync(&data))
            .await
            .map_err(|e| ExtractionError::ExtractionFailed(e.to_string()))?
    }

    fn can_extract(&self, media_type: MediaType) -> bool {
        media_type == MediaType::Pdf
    }

    fn supported_types(&self) -> Vec<MediaType> {
        vec![MediaType::Pdf]
    }
}
