use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use smartcrm_core::{Contact, ContactCounts, ContactInput, ContactPatch, ContactQuery, Demo};

use super::parse_opt;
use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::CurrentUser;
use crate::query_types::ContactListQuery;
use crate::response_types::{CallResponse, MessageResponse};

pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contact_query = ContactQuery {
        search: query.search.clone().filter(|s| !s.trim().is_empty()),
        status: parse_opt(query.status.as_deref())?,
        offset: query.skip,
        limit: query.capped_limit(),
    };
    Ok(Json(state.contact_service.list(contact_query).await?))
}

pub async fn count_contacts(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<ContactCounts>, ApiError> {
    Ok(Json(state.contact_service.count().await?))
}

pub async fn create_contact(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<ContactInput>,
) -> Result<Json<Contact>, ApiError> {
    Ok(Json(state.contact_service.create(input, &user).await?))
}

pub async fn get_contact(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    Ok(Json(state.contact_service.get(&id).await?))
}

pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<ContactPatch>,
) -> Result<Json<Contact>, ApiError> {
    Ok(Json(state.contact_service.update(&id, patch, &user).await?))
}

pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.contact_service.delete(&id, &user).await?;
    Ok(Json(MessageResponse { message: "Contact deleted successfully" }))
}

pub async fn record_call(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CallResponse>, ApiError> {
    let call_time = state.contact_service.record_call(&id, &user).await?;
    Ok(Json(CallResponse { message: "Call recorded", call_time }))
}

pub async fn demo_history(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Demo>>, ApiError> {
    Ok(Json(state.demo_service.history(&id).await?))
}
