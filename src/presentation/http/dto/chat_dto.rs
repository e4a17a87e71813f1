use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::chat_service::ChatAnswer;

#[derive(Debug, Deserialize)]
pub struct ChatRequestDto {
    pub query: String,
    #[serde(default)]
    pub document_id: Option<Uuid>,
    #[serde(default)]
    pub history: Vec<HistoryEntryDto>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryEntryDto {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseDto {
    pub answer: String,
    pub sources: Vec<String>,
}

impl From<ChatAnswer> for ChatResponseDto {
    fn from(answer: ChatAnswer) -> Self {
        Self {
            answer: answer.answer,
            sources: answer.sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let dto: ChatRequestDto = serde_json::from_str(r#"{"query":"hello"}"#).unwrap();
        assert_eq!(dto.query, "hello");
        assert!(dto.document_id.is_none());
        assert!(dto.history.is_empty());
    }

    #[test]
    fn test_request_with_history() {
        let body = r#"{
            "query": "and then?",
            "history": [
                {"role": "user", "content": "first"},
                {"role": "assistant", "content": "second"}
            ]
        }"#;
        let dto: ChatRequestDto = serde_json::from_str(body).unwrap();
        assert_eq!(dto.history.len(), 2);
        assert_eq!(dto.history[1].role, "assistant");
    }
}
