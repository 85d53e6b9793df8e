use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use backend_application::commands::{export_commands, upload_commands};
use backend_application::dtos::{ExportSummary, UploadReceipt};
use backend_application::AppState;

use crate::error::HttpError;

const UPLOAD_FIELD: &str = "file";

#[derive(Deserialize)]
pub struct ExportQuery {
    pub column: String,
}

pub async fn create_csv(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<ExportSummary>, HttpError> {
    let summary = export_commands::export_column(&state, &query.column).await?;
    Ok(Json(summary))
}

pub async fn download_csv(State(state): State<AppState>) -> Result<Response, HttpError> {
    let content = export_commands::latest_export(&state).await?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static("attachment; filename=\"export.csv\""),
            ),
        ],
        content,
    )
        .into_response())
}

/// Takes the multipart `file` field and relays it by mail.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadReceipt>, HttpError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.csv").to_string();
        let content = field.bytes().await.map_err(multipart_error)?;
        let receipt = upload_commands::relay_upload(&state, &filename, content.to_vec()).await?;
        return Ok(Json(receipt));
    }
    Err(HttpError::BadRequest(format!(
        "multipart field '{}' is required",
        UPLOAD_FIELD
    )))
}

fn multipart_error(err: MultipartError) -> HttpError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return HttpError::PayloadTooLarge(format!("upload exceeds the body limit: {}", err));
    }
    HttpError::BadRequest(format!("malformed multipart body: {}", err))
}
