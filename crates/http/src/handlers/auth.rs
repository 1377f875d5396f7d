use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use smartcrm_core::{Credentials, User};

use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::CurrentUser;
use crate::response_types::AuthResponse;

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>, ApiError> {
    let session = state.auth_service.signup(credentials).await?;
    Ok(Json(AuthResponse {
        message: "User created successfully",
        token: session.token,
        user: session.user,
    }))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>, ApiError> {
    let session = state.auth_service.login(credentials).await?;
    Ok(Json(AuthResponse { message: "Login successful", token: session.token, user: session.user }))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.auth_service.get_user(&user.id).await?))
}
