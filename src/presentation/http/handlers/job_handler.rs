use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::infrastructure::container::AppContainer;
use crate::presentation::http::dto::{ApiResponse, JobDto};
use crate::presentation::http::errors::ApiError;

/// `GET /api/jobs/{id}`. Polled by clients during an upload.
pub async fn get_job(
    State(container): State<Arc<AppContainer>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let job = container.job_status.get(id).await?;
    Ok(Json(ApiResponse::ok(JobDto::from(&job))))
}

/// `DELETE /api/jobs/{id}`. Requests cancellation of an in-flight upload;
/// the worker rolls back any partially written chunks.
pub async fn cancel_job(
    State(container): State<Arc<AppContainer>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    container.job_status.cancel(id).await?;
    Ok(StatusCode::ACCEPTED)
}
