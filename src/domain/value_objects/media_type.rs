use serde::{Deserialize, Serialize};

/// Media types accepted by the ingestion surface. Anything else is rejected
/// before extraction is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Pdf,
    Docx,
    PlainText,
}

impl MediaType {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "application/pdf" => Some(MediaType::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(MediaType::Docx)
            }
            "text/plain" => Some(MediaType::PlainText),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            MediaType::PlainText => "text/plain",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_mime())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mime_types() {
        assert_eq!(MediaType::from_mime("application/pdf"), Some(MediaType::Pdf));
        assert_eq!(MediaType::from_mime("text/plain"), Some(MediaType::PlainText));
        assert_eq!(
            MediaType::from_mime(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Some(MediaType::Docx)
        );
    }

    #[test]
    fn test_unknown_mime_type() {
        assert_eq!(MediaType::from_mime("image/png"), None);
        assert_eq!(MediaType::from_mime(""), None);
    }

    #[test]
    fn test_mime_round_trip() {
        for media_type in [MediaType::Pdf, MediaType::Docx, MediaType::PlainText] {
            assert_eq!(MediaType::from_mime(media_type.as_mime()), Some(media_type));
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(MediaType::from_mime("Application/PDF"), Some(MediaType::Pdf));
    }
}
