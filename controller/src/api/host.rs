//! Hosting page channel
//!
//! The hosting page sends `navigate_to` / `preload_state` messages and
//! receives relayed results. It can hold a websocket or post single messages.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;

use crate::actors::receiver::{Dispatch, DropReason, InboundMessage, InboundPayload};
use crate::api::controller::controller_handle;
use crate::api::{error_response, request_origin, ApiState};
use crate::app_state::{AppState, ControllerHandle};
use crate::transport::TargetRef;

/// Accept one host message as a JSON body
pub async fn post_message(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let handle = match controller_handle(&state.app_state).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    let message = InboundMessage::host(request_origin(&headers), None, InboundPayload::Json(body));
    match handle.receiver.process(message) {
        Dispatch::Delivered(kind) => (
            StatusCode::ACCEPTED,
            Json(json!({
                "success": true,
                "type": kind,
            })),
        )
            .into_response(),
        Dispatch::Dropped(reason) => {
            let status = match &reason {
                DropReason::UntrustedOrigin(_) => StatusCode::FORBIDDEN,
                _ => StatusCode::BAD_REQUEST,
            };
            error_response(status, drop_message(&reason))
        }
    }
}

fn drop_message(reason: &DropReason) -> String {
    match reason {
        DropReason::UntrustedOrigin(origin) => format!("Untrusted origin: {origin}"),
        DropReason::MissingSource => "Message has no source".to_string(),
        DropReason::Unparseable => "Message is not valid JSON".to_string(),
        DropReason::MissingDiscriminator => "Message has no type".to_string(),
        DropReason::UnknownEventType(kind) => format!("Unknown message type: {kind}"),
        DropReason::Malformed(detail) => format!("Malformed message: {detail}"),
        DropReason::NoHandler(kind) => format!("No handler for {kind}"),
    }
}

/// WebSocket handler for the hosting page
pub async fn host_websocket(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> impl IntoResponse {
    let handle = match controller_handle(&state.app_state).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    let app_state = state.app_state.clone();
    let origin = request_origin(&headers);
    ws.on_upgrade(move |socket| handle_host_socket(socket, app_state, handle, origin))
        .into_response()
}

async fn handle_host_socket(
    socket: WebSocket,
    app_state: std::sync::Arc<AppState>,
    handle: ControllerHandle,
    origin: String,
) {
    let target = TargetRef::generate();
    let transport = app_state.transport();
    let mut outbound = transport.attach_host(target.clone());

    let (mut sender, mut receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    tracing::info!(target_ref = %target, "Hosting page connected");

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                let message = InboundMessage::host(
                    origin.as_str(),
                    Some(target.clone()),
                    InboundPayload::Text(text.as_str().to_string()),
                );
                if let Dispatch::Dropped(reason) = handle.receiver.process(message) {
                    tracing::debug!(target_ref = %target, reason = ?reason, "Host message dropped");
                }
            }
            Message::Close(_) => {
                break;
            }
            _ => {}
        }
    }

    tracing::info!(target_ref = %target, "Hosting page disconnected");
    transport.detach(&target);
    writer.abort();
}
