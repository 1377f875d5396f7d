use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use smartcrm_core::{Note, NoteInput};

use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::CurrentUser;

pub async fn create_note(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<NoteInput>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.note_service.create(input, &user).await?))
}

pub async fn notes_for_contact(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Path(contact_id): Path<String>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.note_service.list_for_contact(&contact_id).await?))
}
