use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post},
};

use crate::infrastructure::container::AppContainer;
use crate::presentation::http::handlers::{chat_handler, document_handler, job_handler};

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn api_router(container: Arc<AppContainer>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route(
            "/api/documents",
            post(document_handler::upload_document).get(document_handler::list_documents),
        )
        .route(
            "/api/documents/{id}",
            get(document_handler::get_document).delete(document_handler::delete_document),
        )
        .route(
            "/api/jobs/{id}",
            get(job_handler::get_job).delete(job_handler::cancel_job),
        )
        .route("/api/chat", post(chat_handler::chat))
        .with_state(container)
}
