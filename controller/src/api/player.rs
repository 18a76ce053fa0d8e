//! Task player WebSocket handler
//!
//! Each configured player frame holds one websocket. The connection gets a
//! fresh target reference: outbound commands are queued on the transport and
//! written by a dedicated task, inbound text goes through the receiver. A
//! frame that reconnects mounts again and takes over its player id.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use shared_types::PlayerConfiguration;

use crate::actors::coordinator::ControllerMsg;
use crate::actors::receiver::{Dispatch, InboundMessage};
use crate::api::controller::controller_handle;
use crate::api::{error_response, request_origin, ApiState};
use crate::app_state::{AppState, ControllerHandle};
use crate::transport::TargetRef;

/// WebSocket handler for a configured task player
pub async fn player_websocket(
    ws: WebSocketUpgrade,
    Path(player_id): Path<String>,
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> impl IntoResponse {
    let Some(player) = state.app_state.controller_config().player(&player_id).cloned() else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Unknown task player: {player_id}"),
        );
    };
    let handle = match controller_handle(&state.app_state).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    let app_state = state.app_state.clone();
    let origin = request_origin(&headers);
    ws.on_upgrade(move |socket| handle_player_socket(socket, app_state, handle, player, origin))
        .into_response()
}

async fn handle_player_socket(
    socket: WebSocket,
    app_state: std::sync::Arc<AppState>,
    handle: ControllerHandle,
    player: PlayerConfiguration,
    origin: String,
) {
    let target = TargetRef::generate();
    let transport = app_state.transport();
    let mut outbound = transport.attach_player(target.clone());

    let (mut sender, mut receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    tracing::info!(
        player_id = %player.player_id,
        runtime_version = %player.runtime_version,
        target_ref = %target,
        "Task player connected"
    );
    if let Err(e) = handle.actor.send_message(ControllerMsg::PlayerMounted {
        player_id: player.player_id.clone(),
        runtime_version: player.runtime_version.clone(),
        target: target.clone(),
    }) {
        tracing::warn!(player_id = %player.player_id, error = %e, "Controller unavailable");
        transport.detach(&target);
        writer.abort();
        return;
    }

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                let message = InboundMessage::player(origin.as_str(), target.clone(), text.as_str());
                if let Dispatch::Dropped(reason) = handle.receiver.process(message) {
                    tracing::debug!(player_id = %player.player_id, reason = ?reason, "Player message dropped");
                }
            }
            Message::Close(_) => {
                break;
            }
            _ => {}
        }
    }

    tracing::info!(player_id = %player.player_id, target_ref = %target, "Task player disconnected");
    transport.detach(&target);
    writer.abort();
    if let Err(e) = handle.actor.send_message(ControllerMsg::PlayerDetached { target }) {
        tracing::debug!(player_id = %player.player_id, error = %e, "Controller gone before detach");
    }
}
