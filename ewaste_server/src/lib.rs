#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! HTTP surface for the estimator.
//!
//! `POST /predict` runs the prediction service; `GET /lookup` and
//! `GET /health` are read-only helpers; the HTML pages and `/static/*` are
//! served from a configurable directory.

mod error;
mod pages;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use ewaste_core::{DeviceInput, DeviceSpec, Estimator, PredictionResponse};

pub use error::ApiError;

/// Shared per-process state. Cloned into every request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub estimator: Estimator,
    pub static_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(estimator: Estimator, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            estimator,
            static_dir: Arc::new(static_dir.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub model: String,
    pub spec: Option<DeviceSpec>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub trees: usize,
}

pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(state.static_dir.as_path());
    Router::new()
        .route("/", get(pages::root))
        .route("/index.html", get(pages::index))
        .route("/results.html", get(pages::results))
        .route("/predict", post(predict))
        .route("/lookup", get(lookup))
        .route("/health", get(health))
        .nest_service("/static", assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn predict(
    State(state): State<AppState>,
    Json(input): Json<DeviceInput>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let resp = state.estimator.predict(input).map_err(|e| {
        tracing::warn!(error = %e, "prediction failed");
        ApiError::Prediction(e)
    })?;
    Ok(Json(resp))
}

async fn lookup(Query(params): Query<LookupParams>) -> Json<LookupResponse> {
    let spec = ewaste_core::lookup(&params.model);
    Json(LookupResponse {
        model: params.model,
        spec,
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        trees: state.estimator.estimator_count(),
    })
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> eyre::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("binding {addr}"))?;
    let local = listener.local_addr().unwrap_or(addr);
    tracing::info!(addr = %local, trees = state.estimator.estimator_count(), "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("HTTP server error")?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
