//! HTTP and WebSocket routes
//!
//! Task player frames and the hosting page talk to the controller over
//! websockets; the page can also post single messages and read the layout
//! and session state over plain HTTP.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

pub mod controller;
pub mod host;
pub mod player;

use crate::app_state::AppState;

#[derive(Clone)]
pub struct ApiState {
    pub app_state: Arc<AppState>,
}

/// Configure all API routes
pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health_check))
        // Controller routes
        .route("/controller/layout", get(controller::get_layout))
        .route("/controller/state", get(controller::get_state))
        // Hosting page routes
        .route("/host/messages", post(host::post_message))
        .route("/ws/host", get(host::host_websocket))
        // Task player WebSocket route
        .route("/ws/player/{player_id}", get(player::player_websocket))
}

/// Health check endpoint
pub async fn health_check(State(_state): State<ApiState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
        "status": "healthy",
        "service": "task-player-controller",
        "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// `Origin` of the request; browsers always send it on websocket upgrades.
pub(crate) fn request_origin(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": error.into(),
        })),
    )
        .into_response()
}
