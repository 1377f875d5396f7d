//! Typed API error for HTTP handlers.
//!
//! Converts service errors into HTTP responses with a `{"detail": "..."}`
//! body. Handlers return `Result<Json<T>, ApiError>`.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use smartcrm_core::CrmError;
use smartcrm_service::ServiceError;

/// `Internal` logs the real error server-side and returns a static message,
/// so storage details never reach the client.
#[derive(Debug)]
pub enum ApiError {
    /// 400: invalid input from caller.
    BadRequest(String),
    /// 401: bad credentials, invalid or expired token.
    Unauthorized(String),
    /// 403: missing credentials or not the owner.
    Forbidden(String),
    /// 404: requested resource doesn't exist.
    NotFound(String),
    /// 409: unique key already taken.
    Conflict(String),
    /// 500: unexpected failure. Details logged, not exposed.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_owned())
            },
        };
        let body = serde_json::json!({"detail": message});
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<CrmError> for ApiError {
    fn from(err: CrmError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => Self::BadRequest(msg),
            ServiceError::Unauthorized(msg) => Self::Unauthorized(msg),
            ServiceError::Forbidden(msg) => Self::Forbidden(msg),
            ServiceError::NotFound(entity) => Self::NotFound(format!("{entity} not found")),
            ServiceError::Conflict(msg) => Self::Conflict(msg),
            ServiceError::Storage(ref e) if e.is_duplicate() => Self::Conflict(err.to_string()),
            _ => Self::Internal(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use smartcrm_storage::StorageError;

    use super::*;

    #[test]
    fn service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::InvalidInput("bad".to_owned()), StatusCode::BAD_REQUEST),
            (ServiceError::Unauthorized("no".to_owned()), StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden("mine".to_owned()), StatusCode::FORBIDDEN),
            (ServiceError::NotFound("Contact"), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("taken".to_owned()), StatusCode::CONFLICT),
            (ServiceError::Storage(StorageError::Duplicate("x".to_owned())), StatusCode::CONFLICT),
            (ServiceError::Internal("boom".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
