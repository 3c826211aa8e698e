use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use flowdash_core::AppError;

use crate::dto::{CODE_FAILURE, CODE_UNSUPPORTED, RuleResult};

/// HTTP API error wrapper around core application errors.
///
/// Failures are reported inside the result envelope with HTTP 200.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    pub fn code(&self) -> i32 {
        match self.0 {
            AppError::Unsupported(_) => CODE_UNSUPPORTED,
            AppError::Validation(_)
            | AppError::NotFound(_)
            | AppError::Conflict(_)
            | AppError::Store(_)
            | AppError::Internal(_) => CODE_FAILURE,
        }
    }

    pub fn into_envelope<T>(self) -> RuleResult<T> {
        RuleResult::failure(self.code(), self.0.message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.into_envelope::<()>())).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
