use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The application-wide error taxonomy. Every failure a handler can surface
/// is one of these kinds, and each kind maps to exactly one HTTP status.
/// Repository constraint violations are translated into this taxonomy at the
/// persistence boundary, so handlers never inspect raw database errors.
#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    /// Malformed or out-of-range input: score bounds, future years,
    /// duplicate username/email/slug, reserved usernames.
    #[error("{0}")]
    Validation(String),

    /// A second review by the same author for the same title. Kept distinct
    /// from Validation even though both answer 400, so callers (and tests)
    /// can tell the two apart from the response body.
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid credentials on a protected action.
    #[error("authentication credentials were not provided or are invalid")]
    Unauthenticated,

    /// Authenticated, but the actor's role/ownership does not permit this.
    #[error("you do not have permission to perform this action")]
    Forbidden,

    /// The resource, or a parent of a nested resource, does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unexpected storage failure. Details are logged, never echoed.
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    /// Stable machine-readable kind tag carried in the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // Validation and Conflict share 400 by contract, the body
            // distinguishes them.
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.kind(),
            "detail": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
