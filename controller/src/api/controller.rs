//! Controller API endpoints
//!
//! The layout tells the hosting page which frames to create; the state is a
//! read-only view of the running session.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use shared_types::{ControllerConfiguration, ItemSize, PlayerConfiguration};

use crate::actors::coordinator::ControllerMsg;
use crate::api::{error_response, ApiState};
use crate::app_state::{AppState, ControllerHandle};

/// One task player frame the hosting page should create
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FrameLayout {
    pub player_id: String,
    pub runtime_version: String,
    pub frame_src: String,
}

impl From<&PlayerConfiguration> for FrameLayout {
    fn from(player: &PlayerConfiguration) -> Self {
        Self {
            player_id: player.player_id.clone(),
            runtime_version: player.runtime_version.clone(),
            frame_src: frame_src(&player.frame_content_file),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    pub item_size: ItemSize,
    pub show_player_info: bool,
    pub players: Vec<FrameLayout>,
}

impl From<&ControllerConfiguration> for LayoutResponse {
    fn from(config: &ControllerConfiguration) -> Self {
        Self {
            item_size: config.item_size.unwrap_or_default(),
            show_player_info: config.show_player_info,
            players: config.players.iter().map(FrameLayout::from).collect(),
        }
    }
}

/// Runtime pages post their events to the parent window.
pub fn frame_src(frame_content_file: &str) -> String {
    format!("./react-runtime/{frame_content_file}?eventTargetWindow=parent")
}

pub(crate) async fn controller_handle(
    app_state: &AppState,
) -> Result<ControllerHandle, axum::response::Response> {
    app_state.ensure_controller().await.map_err(|e| {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to start controller: {e}"),
        )
    })
}

/// Frame layout from the controller configuration
pub async fn get_layout(State(state): State<ApiState>) -> impl IntoResponse {
    let layout = LayoutResponse::from(state.app_state.controller_config());
    (StatusCode::OK, Json(layout))
}

/// Snapshot of the running session
pub async fn get_state(State(state): State<ApiState>) -> impl IntoResponse {
    let handle = match controller_handle(&state.app_state).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    match ractor::call!(handle.actor, |reply| ControllerMsg::GetSnapshot { reply }) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read controller state: {e}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_defaults_item_size() {
        let config = ControllerConfiguration {
            trace_log_transmission: None,
            math_jax_cdn_url: None,
            item_size: None,
            players: vec![PlayerConfiguration {
                player_id: "p1".to_string(),
                runtime_version: "9.1".to_string(),
                frame_content_file: "index-9.1.html".to_string(),
            }],
            show_player_info: true,
        };

        let layout = LayoutResponse::from(&config);
        assert_eq!(layout.item_size, ItemSize { height: 768, width: 1024 });
        assert!(layout.show_player_info);
        assert_eq!(
            layout.players[0].frame_src,
            "./react-runtime/index-9.1.html?eventTargetWindow=parent"
        );
    }
}
