use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use smartcrm_core::ActivityLog;

use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::CurrentUser;
use crate::query_types::PaginationQuery;

pub async fn list_activity(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Vec<ActivityLog>>, ApiError> {
    Ok(Json(state.activity_service.list(query.skip, query.capped_limit()).await?))
}
