use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use smartcrm_core::{Meeting, MeetingInput, MeetingPatch, MeetingStatus};

use super::parse_opt;
use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::CurrentUser;
use crate::query_types::{MeetingListQuery, MeetingStatusRequest};
use crate::response_types::MessageResponse;

pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<MeetingInput>,
) -> Result<Json<Meeting>, ApiError> {
    Ok(Json(state.meeting_service.create(input, &user).await?))
}

pub async fn list_meetings(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MeetingListQuery>,
) -> Result<Json<Vec<Meeting>>, ApiError> {
    let status: Option<MeetingStatus> = parse_opt(query.status.as_deref())?;
    let meetings = state.meeting_service.list(&user, status, query.skip, query.limit).await?;
    Ok(Json(meetings))
}

pub async fn get_meeting(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Meeting>, ApiError> {
    Ok(Json(state.meeting_service.get(&user, &id).await?))
}

pub async fn update_meeting(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<MeetingPatch>,
) -> Result<Json<Meeting>, ApiError> {
    Ok(Json(state.meeting_service.update(&user, &id, patch).await?))
}

pub async fn set_meeting_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<MeetingStatusRequest>,
) -> Result<Json<Meeting>, ApiError> {
    let status: MeetingStatus = req.status.parse()?;
    Ok(Json(state.meeting_service.set_status(&user, &id, status).await?))
}

pub async fn delete_meeting(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.meeting_service.delete(&user, &id).await?;
    Ok(Json(MessageResponse { message: "Meeting deleted successfully" }))
}
