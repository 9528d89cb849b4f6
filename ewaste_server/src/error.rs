use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use ewaste_core::EstimatorError;

/// Request-level failures, rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Prediction(EstimatorError),
    NotFound(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Prediction(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Prediction error: {e}"),
            ),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, what.to_string()),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
