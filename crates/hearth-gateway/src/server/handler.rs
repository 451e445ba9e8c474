//! WebSocket handler

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::connection::Connection;
use crate::handlers::MessageDispatcher;
use crate::protocol::{CloseCode, GatewayMessage, HelloPayload};
use crate::server::GatewayState;

const MESSAGE_BUFFER_SIZE: usize = 100;

pub async fn gateway_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let session_id = Connection::generate_id();
    let (tx, mut rx) = mpsc::channel::<GatewayMessage>(MESSAGE_BUFFER_SIZE);
    let connection = state
        .connection_manager()
        .add_connection(session_id.clone(), tx);

    tracing::info!(session_id = %session_id, "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    let heartbeat_interval = state.heartbeat_interval();
    let hello = GatewayMessage::hello(HelloPayload::with_interval(
        state.config().heartbeat_interval_ms,
    ));
    let hello_sent = match hello.to_json() {
        Ok(json) => ws_sink.send(Message::Text(json)).await.is_ok(),
        Err(_) => false,
    };
    if !hello_sent {
        tracing::warn!(session_id = %session_id, "Failed to send HELLO");
        state.dispatcher().disconnect(&session_id).await;
        return;
    }

    // The send task owns the sink; other tasks report a close code through
    // this channel.
    let (close_tx, mut close_rx) = mpsc::channel::<CloseCode>(1);

    let session_id_send = session_id.clone();
    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    let Ok(json) = msg.to_json() else { continue };
                    if ws_sink.send(Message::Text(json)).await.is_err() {
                        tracing::warn!(session_id = %session_id_send, "Failed to write frame");
                        return;
                    }
                }
                code = close_rx.recv() => {
                    if let Some(code) = code {
                        let frame = CloseFrame {
                            code: code.as_u16(),
                            reason: code.description().into(),
                        };
                        ws_sink.send(Message::Close(Some(frame))).await.ok();
                    }
                    return;
                }
            }
        }
        ws_sink.close().await.ok();
    });

    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let close_tx_recv = close_tx.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            let close = match msg {
                Ok(Message::Text(text)) => {
                    handle_text_message(&state_recv, &connection_recv, &text).await
                }
                Ok(Message::Binary(_)) => Some(CloseCode::DecodeError),
                Ok(Message::Ping(_) | Message::Pong(_)) => None,
                Ok(Message::Close(_)) => {
                    tracing::info!(session_id = %connection_recv.session_id(), "Client closed connection");
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %connection_recv.session_id(),
                        error = %e,
                        "WebSocket error"
                    );
                    return;
                }
            };
            if let Some(code) = close {
                tracing::debug!(
                    session_id = %connection_recv.session_id(),
                    close_code = %code,
                    "Closing connection"
                );
                close_tx_recv.send(code).await.ok();
                return;
            }
        }
    });

    let connection_hb = connection.clone();
    let heartbeat_task = tokio::spawn(async move {
        let timeout = heartbeat_interval * 2;
        let mut check = interval(heartbeat_interval / 2);
        loop {
            check.tick().await;
            let since = connection_hb.time_since_heartbeat().await;
            if since > timeout {
                tracing::warn!(
                    session_id = %connection_hb.session_id(),
                    since_ms = since.as_millis(),
                    "Connection timed out (no heartbeat)"
                );
                close_tx.send(CloseCode::SessionTimeout).await.ok();
                return;
            }
        }
    });

    let send_abort = send_task.abort_handle();
    let recv_abort = recv_task.abort_handle();
    let heartbeat_abort = heartbeat_task.abort_handle();

    tokio::select! {
        _ = recv_task => {
            // Give the writer a moment to flush a pending close frame.
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        _ = send_task => {}
        _ = heartbeat_task => {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    send_abort.abort();
    recv_abort.abort();
    heartbeat_abort.abort();

    tracing::info!(session_id = %session_id, "Cleaning up connection");
    state.dispatcher().disconnect(&session_id).await;
}

/// Returns a close code when the session must end.
async fn handle_text_message(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Option<CloseCode> {
    let message = match GatewayMessage::from_json(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(
                session_id = %connection.session_id(),
                error = %e,
                "Failed to parse frame"
            );
            return Some(CloseCode::DecodeError);
        }
    };

    match MessageDispatcher::dispatch(state, connection, message).await {
        Ok(close) => close,
        Err(e) => {
            tracing::warn!(
                session_id = %connection.session_id(),
                error = %e,
                "Handler error"
            );
            Some(e.to_close_code())
        }
    }
}
