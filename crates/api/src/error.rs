//! Error-to-response mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use probill_shared::AppError;

/// Wrapper turning the shared error taxonomy into HTTP responses.
///
/// Every repository error converts into [`AppError`], so handlers can use
/// `?` end to end and this single type renders the response.
#[derive(Debug)]
pub struct ApiError(AppError);

impl ApiError {
    /// Builds a validation error from any displayable cause.
    pub fn validation(cause: impl std::fmt::Display) -> Self {
        Self(AppError::Validation(cause.to_string()))
    }

    /// Builds a not-found error.
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self(AppError::NotFound(what.to_string()))
    }

    /// Builds an unauthorized error.
    pub fn unauthorized(cause: impl std::fmt::Display) -> Self {
        Self(AppError::Unauthorized(cause.to_string()))
    }
}

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        let body = json!({
            "error": self.0.error_code(),
            "message": self.0.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let response = ApiError::from(AppError::NotFound("invoice 4".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::from(AppError::Conflict("dup".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response =
            ApiError::from(AppError::ReferentialConflict("in use".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ApiError::validation("missing name").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
