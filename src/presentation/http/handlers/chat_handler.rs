use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::application::use_cases::{AskQuestionRequest, HistoryEntry};
use crate::infrastructure::container::AppContainer;
use crate::presentation::http::dto::{ApiResponse, ChatRequestDto, ChatResponseDto};
use crate::presentation::http::errors::ApiError;

/// `POST /api/chat`. Stateless: the caller supplies the conversation history
/// it wants considered.
pub async fn chat(
    State(container): State<Arc<AppContainer>>,
    Json(request): Json<ChatRequestDto>,
) -> Result<impl IntoResponse, ApiError> {
    let history = request
        .history
        .into_iter()
        .map(|entry| HistoryEntry {
            role: entry.role,
            content: entry.content,
        })
        .collect();

    let answer = container
        .ask_question
        .execute(AskQuestionRequest {
            query: request.query,
            document_id: request.document_id,
            history,
        })
        .await?;

    Ok(Json(ApiResponse::ok(ChatResponseDto::from(answer))))
}
