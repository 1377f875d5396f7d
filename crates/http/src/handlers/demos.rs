use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use smartcrm_core::{
    Demo, DemoGrouping, DemoInput, DemoPeriodStats, DemoStats, DemoWatch, parse_timestamp,
};

use super::parse_opt;
use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::CurrentUser;
use crate::query_types::DemoRangeQuery;

fn range(query: &DemoRangeQuery) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let start = parse_timestamp(&query.start)?;
    let end = parse_timestamp(&query.end)?;
    if end < start {
        return Err(ApiError::BadRequest("end must not be before start".to_owned()));
    }
    Ok((start, end))
}

pub async fn give_demo(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<DemoInput>,
) -> Result<Json<Demo>, ApiError> {
    Ok(Json(state.demo_service.give(input, &user).await?))
}

/// The body is optional; without `watched_at` the current time is used.
pub async fn mark_watched(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    watch: Option<Json<DemoWatch>>,
) -> Result<Json<Demo>, ApiError> {
    let watch = watch.map(|Json(w)| w).unwrap_or_default();
    Ok(Json(state.demo_service.mark_watched(&id, watch, &user).await?))
}

pub async fn demo_report(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<DemoRangeQuery>,
) -> Result<Json<Vec<DemoPeriodStats>>, ApiError> {
    let (start, end) = range(&query)?;
    let grouping: DemoGrouping = parse_opt(query.group_by.as_deref())?.unwrap_or_default();
    Ok(Json(state.demo_service.report(start, end, grouping).await?))
}

pub async fn demo_summary(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<DemoRangeQuery>,
) -> Result<Json<DemoStats>, ApiError> {
    let (start, end) = range(&query)?;
    Ok(Json(state.demo_service.summary(start, end).await?))
}
