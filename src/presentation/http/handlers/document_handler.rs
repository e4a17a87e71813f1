use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::application::use_cases::UploadDocumentRequest;
use crate::infrastructure::container::AppContainer;
use crate::presentation::http::dto::{ApiResponse, DocumentDto, UploadAcceptedDto};
use crate::presentation::http::errors::ApiError;

/// `POST /api/documents`. Accepts one multipart file field, responds 202
/// with the job to poll; processing continues in the background.
pub async fn upload_document(
    State(container): State<Arc<AppContainer>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .ok_or_else(|| ApiError::BadRequest("File name not provided".to_string()))?
            .to_string();
        let declared_media_type = field
            .content_type()
            .ok_or_else(|| ApiError::BadRequest("Content type not provided".to_string()))?
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {}", e)))?
            .to_vec();

        let response = container
            .upload_document
            .execute(UploadDocumentRequest {
                file_name,
                declared_media_type,
                data,
            })
            .await?;

        return Ok((
            StatusCode::ACCEPTED,
            Json(ApiResponse::ok(UploadAcceptedDto::from(response))),
        ));
    }

    Err(ApiError::BadRequest("No file provided".to_string()))
}

/// `GET /api/documents`.
pub async fn list_documents(
    State(container): State<Arc<AppContainer>>,
) -> Result<impl IntoResponse, ApiError> {
    let documents = container.list_documents.list().await?;
    let dtos: Vec<DocumentDto> = documents.iter().map(DocumentDto::from).collect();
    Ok(Json(ApiResponse::ok(dtos)))
}

/// `GET /api/documents/{id}`.
pub async fn get_document(
    State(container): State<Arc<AppContainer>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let document = container.list_documents.get(id).await?;
    Ok(Json(ApiResponse::ok(DocumentDto::from(&document))))
}

/// `DELETE /api/documents/{id}`. Removes the document and all of its chunks.
pub async fn delete_document(
    State(container): State<Arc<AppContainer>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    container.delete_document.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
