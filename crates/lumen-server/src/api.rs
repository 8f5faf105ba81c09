//! REST API for the lumen core
//!
//! Exposes the two externally triggered operations (fade-out and the
//! diagnostics report) plus the write path the adaptive-control loop uses
//! to publish per-device state.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lumen_core::{Context, DeviceId};
use lumen_diagnostics::Reporter;
use lumen_fade::{FadeCoordinator, FadeError, TargetOutcome};
use lumen_store::{AdaptiveStateRegistry, DeviceState};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::FadeConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<FadeCoordinator>,
    pub reporter: Arc<Reporter>,
    pub registry: AdaptiveStateRegistry,
    pub fade_defaults: FadeConfig,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/", get(api_status))
        .route("/api/fade_out", post(fade_out))
        .route("/api/report", get(report))
        .route("/api/adaptive_state", post(set_adaptive_state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct ApiStatus {
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

async fn api_status() -> impl IntoResponse {
    Json(ApiStatus {
        message: "API running.",
    })
}

#[derive(Deserialize)]
struct FadeOutRequest {
    device_id: DeviceId,
    #[serde(default)]
    duration_s: Option<u64>,
    #[serde(default)]
    buffer_s: Option<u64>,
}

#[derive(Serialize)]
struct FadeOutResponse {
    device_name: String,
    outcome: &'static str,
    summary: String,
    targets: Vec<TargetOutcome>,
}

async fn fade_out(State(state): State<AppState>, Json(req): Json<FadeOutRequest>) -> Response {
    let duration = Duration::from_secs(req.duration_s.unwrap_or(state.fade_defaults.duration_s));
    let buffer = Duration::from_secs(req.buffer_s.unwrap_or(state.fade_defaults.buffer_s));

    match state
        .coordinator
        .fade_out_with_buffer(&req.device_id, duration, buffer, Context::new())
        .await
    {
        Ok(report) => Json(FadeOutResponse {
            device_name: report.device_name.clone(),
            outcome: report.outcome.as_str(),
            summary: report.summary(),
            targets: report.targets,
        })
        .into_response(),
        Err(err @ FadeError::DeviceNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "Fade-out invocation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn report(State(state): State<AppState>) -> Response {
    match state.reporter.report().await {
        Ok(text) => text.into_response(),
        Err(err) => {
            warn!(error = %err, "Diagnostics report failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

#[derive(Deserialize)]
struct AdaptiveStateRequest {
    device_id: DeviceId,
    #[serde(default)]
    manual_override: bool,
    #[serde(default)]
    last_profile: Option<String>,
}

async fn set_adaptive_state(
    State(state): State<AppState>,
    Json(req): Json<AdaptiveStateRequest>,
) -> Response {
    let device_state = DeviceState {
        manual_override: req.manual_override,
        last_profile: req.last_profile,
    };

    match state.registry.set(&req.device_id, &device_state) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
    }
}
