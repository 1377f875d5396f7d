//! Bearer-token extractor for authenticated routes.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use smartcrm_core::AuthUser;

use crate::AppState;
use crate::api_error::ApiError;

/// The authenticated caller. Missing credentials are a 403, a bad or
/// expired token a 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(parts).ok_or_else(|| ApiError::Forbidden("Not authenticated".to_owned()))?;
        let user = state.auth_service.verify_token(token).await?;
        Ok(Self(user))
    }
}
