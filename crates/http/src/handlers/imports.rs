//! Multipart upload endpoints for spreadsheet preview and import.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use smartcrm_core::import::{ImportPreview, ImportReport};

use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::CurrentUser;

#[derive(Default)]
struct Upload {
    file: Option<Vec<u8>>,
    column_mapping: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut upload = Upload::default();
    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => upload.file = Some(field.bytes().await?.to_vec()),
            Some("column_mapping") => upload.column_mapping = Some(field.text().await?),
            other => tracing::debug!(field = ?other, "ignoring unexpected multipart field"),
        }
    }
    Ok(upload)
}

fn require_file(upload: &mut Upload) -> Result<Vec<u8>, ApiError> {
    upload
        .file
        .take()
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest("An Excel file is required".to_owned()))
}

pub async fn preview(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    multipart: Multipart,
) -> Result<Json<ImportPreview>, ApiError> {
    let mut upload = read_upload(multipart).await?;
    let bytes = require_file(&mut upload)?;
    Ok(Json(state.import_service.preview(bytes).await?))
}

pub async fn import(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Json<ImportReport>, ApiError> {
    let mut upload = read_upload(multipart).await?;
    let bytes = require_file(&mut upload)?;
    let mapping = upload
        .column_mapping
        .ok_or_else(|| ApiError::BadRequest("column_mapping is required".to_owned()))?;
    Ok(Json(state.import_service.import(bytes, &mapping, &user).await?))
}
