use serde::{Deserialize, Serialize};

/// Lifecycle of an uploaded document and its ingestion job.
/// `Completed` and `Error` are terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IngestionStatus {
    Uploading,
    Processing,
    Completed,
    Error(String),
}

impl IngestionStatus {
    pub fn is_uploading(&self) -> bool {
        matches!(self, IngestionStatus::Uploading)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, IngestionStatus::Processing)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, IngestionStatus::Completed)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, IngestionStatus::Error(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestionStatus::Completed | IngestionStatus::Error(_))
    }

    pub fn can_transition_to(&self, next: &IngestionStatus) -> bool {
        matches!(
            (self, next),
            (IngestionStatus::Uploading, IngestionStatus::Processing)
                | (IngestionStatus::Uploading, IngestionStatus::Error(_))
                | (IngestionStatus::Processing, IngestionStatus::Completed)
                | (IngestionStatus::Processing, IngestionStatus::Error(_))
        )
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            IngestionStatus::Error(cause) => Some(cause),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionStatus::Uploading => "uploading",
            IngestionStatus::Processing => "processing",
            IngestionStatus::Completed => "completed",
            IngestionStatus::Error(_) => "error",
        }
    }

    /// Reconstructs a status from its stored form. The error cause is kept in
    /// a separate column, so it is supplied alongside the tag.
    pub fn from_parts(tag: &str, error_message: Option<String>) -> Result<Self, String> {
        match tag.to_lowercase().as_str() {
            "uploading" => Ok(IngestionStatus::Uploading),
            "processing" => Ok(IngestionStatus::Processing),
            "completed" => Ok(IngestionStatus::Completed),
            "error" => Ok(IngestionStatus::Error(
                error_message.unwrap_or_else(|| "unknown error".to_string()),
            )),
            other => Err(format!("Invalid ingestion status: {}", other)),
        }
    }
}

impl std::fmt::Display for IngestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(IngestionStatus::Uploading.can_transition_to(&IngestionStatus::Processing));
        assert!(IngestionStatus::Processing.can_transition_to(&IngestionStatus::Completed));
        assert!(
            IngestionStatus::Processing
                .can_transition_to(&IngestionStatus::Error("boom".to_string()))
        );
    }

    #[test]
    fn test_terminal_states_are_final() {
        let completed = IngestionStatus::Completed;
        let error = IngestionStatus::Error("boom".to_string());

        for next in [
            IngestionStatus::Uploading,
            IngestionStatus::Processing,
            IngestionStatus::Completed,
            IngestionStatus::Error("again".to_string()),
        ] {
            assert!(!completed.can_transition_to(&next));
            assert!(!error.can_transition_to(&next));
        }
    }

    #[test]
    fn test_no_skipping_upload() {
        assert!(!IngestionStatus::Uploading.can_transition_to(&IngestionStatus::Completed));
    }

    #[test]
    fn test_round_trip_with_error_cause() {
        let status = IngestionStatus::Error("extraction failed".to_string());
        let restored = IngestionStatus::from_parts(
            status.as_str(),
            status.error_message().map(|s| s.to_string()),
        )
        .unwrap();
        assert_eq!(restored, status);
    }

    #[test]
    fn test_invalid_tag() {
        assert!(IngestionStatus::from_parts("pending", None).is_err());
    }
}
