use crate::extractors::authenticated_user::bearer_token;
use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use log::*;
use relay::connection::ConnectionId;
use relay::message::{ClientMessage, Event};
use serde::Deserialize;
use tokio::sync::mpsc;

#[derive(Debug, Deserialize)]
pub(crate) struct WsQuery {
    token: Option<String>,
}

/// Realtime endpoint. The client presents its access token either as a
/// `token` query parameter or as a bearer header at connect time.
///
/// Authentication happens before the upgrade: a missing or invalid token is
/// answered with a bare 401 and no WebSocket session ever starts, so no
/// registration is created and no `connected` event is emitted. Clients can
/// only infer the rejection from the failed handshake.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> Response {
    let token = match query.token.or_else(|| bearer_token(&headers)) {
        Some(token) => token,
        None => {
            warn!("WebSocket connection attempted without a token");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    let subject = match app_state.tokens.verify_access(&token) {
        Ok(subject) => subject,
        Err(err) => {
            warn!("WebSocket connection rejected: {err}");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, subject.to_string(), app_state))
}

/// Per-connection session: register with the relay, acknowledge the
/// handshake, pump outbound frames, answer control messages, and clean up
/// with a compare-and-clear unregister when either side closes.
async fn handle_socket(socket: WebSocket, user_id: String, app_state: AppState) {
    debug!("Establishing realtime connection for user {user_id}");

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    // The handshake ack is queued before the registration is published, so
    // no delivery that finds this connection can land ahead of `connected`.
    let connection_id = ConnectionId::new();
    if let Some(frame) = relay::Manager::encode(&Event::Connected {
        user_id: user_id.clone(),
        connection_id: connection_id.as_str().to_string(),
    }) {
        let _ = tx.send(frame);
    }

    app_state
        .relay
        .register_connection(user_id.clone(), connection_id.clone(), tx.clone());

    let mut outbound = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if sink.send(message).await.is_err() || closing {
                break;
            }
        }
    });

    let control_tx = tx.clone();
    let control_relay = app_state.relay.clone();
    let mut inbound = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Ping) => {
                        if let Some(frame) = relay::Manager::encode(&Event::Pong {
                            timestamp: Utc::now(),
                        }) {
                            let _ = control_tx.send(frame);
                        }
                    }
                    Ok(ClientMessage::UsersOnline) => {
                        if let Some(frame) = relay::Manager::encode(&Event::UsersOnlineList {
                            users: control_relay.online_users(),
                        }) {
                            let _ = control_tx.send(frame);
                        }
                    }
                    Err(err) => {
                        debug!("Ignoring unrecognized client message: {err}");
                    }
                },
                Message::Close(_) => break,
                // Transport-level ping/pong is handled by the library;
                // binary frames have no meaning on this channel.
                _ => {}
            }
        }
    });

    // Whichever half finishes first ends the session.
    tokio::select! {
        _ = &mut outbound => inbound.abort(),
        _ = &mut inbound => outbound.abort(),
    }

    app_state
        .relay
        .unregister_connection(&user_id, &connection_id);
    debug!("Realtime connection closed for user {user_id}");
}
