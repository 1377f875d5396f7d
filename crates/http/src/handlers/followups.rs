use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use smartcrm_core::{
    DateFilter, FollowUp, FollowUpFilter, FollowUpInput, FollowUpView, NextFollowUp,
    UpcomingFollowUps,
};
use smartcrm_service::CompletedFollowUp;

use super::parse_opt;
use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::CurrentUser;
use crate::query_types::{DateFilterQuery, FollowUpListQuery, FollowUpPageQuery};
use crate::response_types::FollowUpsByDate;

pub async fn create_followup(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<FollowUpInput>,
) -> Result<Json<FollowUp>, ApiError> {
    Ok(Json(state.followup_service.create(input, &user).await?))
}

pub async fn list_followups(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<FollowUpListQuery>,
) -> Result<Json<Vec<FollowUpView>>, ApiError> {
    let filter: Option<FollowUpFilter> = parse_opt(query.status.as_deref())?;
    Ok(Json(state.followup_service.list(filter, Utc::now()).await?))
}

pub async fn upcoming_followups(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<UpcomingFollowUps>, ApiError> {
    Ok(Json(state.followup_service.upcoming(Utc::now()).await?))
}

pub async fn followups_by_date(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<DateFilterQuery>,
) -> Result<Json<FollowUpsByDate>, ApiError> {
    let filter: DateFilter = parse_opt(query.date_filter.as_deref())?.unwrap_or_default();
    let followups = state.followup_service.by_date(filter, Utc::now()).await?;
    Ok(Json(FollowUpsByDate { filter: filter.as_str(), count: followups.len(), followups }))
}

pub async fn paginated_followups(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<FollowUpPageQuery>,
) -> Result<Json<Vec<FollowUpView>>, ApiError> {
    let filter: DateFilter = parse_opt(query.date_filter.as_deref())?.unwrap_or_default();
    let page = state
        .followup_service
        .paginated(filter, query.skip, query.limit, Utc::now())
        .await?;
    Ok(Json(page))
}

/// The body is optional; an empty one just completes the follow-up.
pub async fn complete_followup(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    next: Option<Json<NextFollowUp>>,
) -> Result<Json<CompletedFollowUp>, ApiError> {
    let next = next.map(|Json(n)| n).unwrap_or_default();
    Ok(Json(state.followup_service.complete(&id, next, &user).await?))
}
