//! Request-level errors and their HTTP mapping

use advisor_lib::PredictionError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure of a single request. Every variant renders as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing request fields
    #[error("{message}")]
    Validation { status: StatusCode, message: String },

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { status, .. } => *status,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_error_is_server_error() {
        let err = ApiError::from(PredictionError::FeatureMismatch {
            expected: 6,
            actual: 7,
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "feature vector has 7 values, model expects 6");
    }

    #[test]
    fn test_validation_keeps_status() {
        let err = ApiError::Validation {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "missing field `N`".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
