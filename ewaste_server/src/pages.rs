//! HTML pages read from the static directory on each request.

use std::path::Path;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;

use crate::{ApiError, AppState};

async fn read_page(dir: &Path, name: &str) -> Option<String> {
    tokio::fs::read_to_string(dir.join(name)).await.ok()
}

pub async fn root(State(state): State<AppState>) -> Response {
    match read_page(&state.static_dir, "index.html").await {
        Some(body) => Html(body).into_response(),
        None => Json(json!({
            "message": "E-Waste Material Recovery Estimator API",
            "endpoints": ["/predict", "/lookup", "/health"],
        }))
        .into_response(),
    }
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    read_page(&state.static_dir, "index.html")
        .await
        .map(Html)
        .ok_or(ApiError::NotFound("Index page not found"))
}

pub async fn results(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    read_page(&state.static_dir, "results.html")
        .await
        .map(Html)
        .ok_or(ApiError::NotFound("Results page not found"))
}
