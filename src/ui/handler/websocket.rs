//! WebSocket connection handler and per-connection session state machine.
//!
//! A connection starts `Unauthenticated` and must authenticate before any
//! subscribe/relay action is honored. Messages from one connection are
//! processed sequentially, so a disconnect racing an in-flight external
//! call is applied only after that transition settles.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, RoomId, UserProfile},
    infrastructure::dto::websocket::{ClientMessage, ServerMessage, UserDto},
    ui::state::AppState,
    usecase::{
        AuthenticateConnectionUseCase, AuthenticateError, DisconnectConnectionUseCase,
        PresenceTracker, RelayEventUseCase, RoomBroadcaster, SubscribeRoomUseCase,
        UnsubscribeRoomUseCase,
    },
};

/// Protocol state of one connection.
enum Session {
    Unauthenticated,
    Authenticated { profile: UserProfile },
}

impl Session {
    fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated { profile } => Some(profile),
            Self::Unauthenticated => None,
        }
    }
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection = ConnectionId::generate();

    // Channel other components use to reach this client.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.registry.register(connection.clone(), tx).await;
    tracing::info!(connection = %connection, "websocket connected");

    let (mut sender, mut receiver) = socket.split();

    // Forward queued pushes to the transport, in order.
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sender.send(Message::Text(message.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let recv_connection = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut session = Session::Unauthenticated;
        while let Some(message) = receiver.next().await {
            let message = match message {
                Ok(message) => message,
                Err(e) => {
                    tracing::error!(connection = %recv_connection, "WebSocket error: {}", e);
                    break;
                }
            };

            match message {
                Message::Text(text) => {
                    recv_state.registry.touch(&recv_connection).await;
                    handle_message(&recv_state, &recv_connection, &mut session, text.as_str())
                        .await;
                }
                Message::Close(_) => {
                    tracing::info!(connection = %recv_connection, "client requested close");
                    break;
                }
                _ => {}
            }
        }
    });

    // If either direction finishes, tear the other down too.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let disconnect = DisconnectConnectionUseCase::new(state.registry.clone());
    if disconnect.execute(&connection).await.is_none() {
        tracing::warn!(connection = %connection, "connection already unregistered at teardown");
    }
}

async fn handle_message(
    state: &Arc<AppState>,
    connection: &ConnectionId,
    session: &mut Session,
    text: &str,
) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(connection = %connection, "failed to parse message: {}", e);
            push(
                state,
                connection,
                &ServerMessage::Error {
                    message: "unrecognized message".to_string(),
                },
            )
            .await;
            return;
        }
    };

    match message {
        // Liveness probe, answered in any session state.
        ClientMessage::Ping => {
            push(state, connection, &ServerMessage::Pong).await;
        }

        ClientMessage::Authenticate { token } => {
            if session.profile().is_some() {
                // Re-authentication would overwrite the binding. Refused,
                // connection stays open.
                tracing::error!(connection = %connection, "authenticate on already-bound connection refused");
                push(
                    state,
                    connection,
                    &ServerMessage::Error {
                        message: "connection is already bound to a user".to_string(),
                    },
                )
                .await;
                return;
            }

            let usecase = AuthenticateConnectionUseCase::new(
                state.verifier.clone(),
                state.resolver.clone(),
                state.memberships.clone(),
                state.registry.clone(),
            );
            match usecase.execute(connection, &token).await {
                Ok(authenticated) => {
                    push(
                        state,
                        connection,
                        &ServerMessage::Authenticated {
                            user: UserDto::from(&authenticated.profile),
                        },
                    )
                    .await;

                    PresenceTracker::new(state.registry.clone())
                        .announce_online(
                            &authenticated.profile,
                            &authenticated.newly_present_rooms,
                            connection,
                        )
                        .await;

                    *session = Session::Authenticated {
                        profile: authenticated.profile,
                    };
                }
                Err(AuthenticateError::ConnectionGone) => {
                    // Disconnected while verification was in flight; the
                    // result is discarded.
                }
                Err(err) => {
                    push(
                        state,
                        connection,
                        &ServerMessage::AuthError {
                            message: err.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        ClientMessage::Subscribe { room_id } => {
            let Some(profile) = session.profile().cloned() else {
                push_authentication_required(state, connection).await;
                return;
            };
            let Ok(room_id) = RoomId::new(room_id) else {
                push_invalid_room(state, connection).await;
                return;
            };

            let usecase = SubscribeRoomUseCase::new(state.memberships.clone(), state.registry.clone());
            match usecase.execute(connection, &profile.user_id, room_id.clone()).await {
                Ok(newly_subscribed) => {
                    push(
                        state,
                        connection,
                        &ServerMessage::JoinedRoom {
                            room_id: room_id.as_str().to_string(),
                        },
                    )
                    .await;
                    if newly_subscribed {
                        let note = ServerMessage::UserJoinedRoom {
                            room_id: room_id.as_str().to_string(),
                            user_id: profile.user_id.as_str().to_string(),
                            display_name: profile.display_name.clone(),
                        }
                        .to_json();
                        RoomBroadcaster::new(state.registry.clone())
                            .broadcast(&room_id, &note, Some(connection))
                            .await;
                    }
                }
                Err(err) => {
                    push(
                        state,
                        connection,
                        &ServerMessage::Error {
                            message: err.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        ClientMessage::Unsubscribe { room_id } => {
            let Some(profile) = session.profile().cloned() else {
                push_authentication_required(state, connection).await;
                return;
            };
            let Ok(room_id) = RoomId::new(room_id) else {
                push_invalid_room(state, connection).await;
                return;
            };

            let usecase = UnsubscribeRoomUseCase::new(state.registry.clone());
            if usecase.execute(connection, &room_id).await {
                push(
                    state,
                    connection,
                    &ServerMessage::LeftRoom {
                        room_id: room_id.as_str().to_string(),
                    },
                )
                .await;
                let note = ServerMessage::UserLeftRoom {
                    room_id: room_id.as_str().to_string(),
                    user_id: profile.user_id.as_str().to_string(),
                }
                .to_json();
                // The connection is already out of the room; the broadcast
                // reaches the remaining subscribers only.
                RoomBroadcaster::new(state.registry.clone())
                    .broadcast(&room_id, &note, Some(connection))
                    .await;
            }
        }

        relay => {
            let Some(profile) = session.profile().cloned() else {
                push_authentication_required(state, connection).await;
                return;
            };
            let Some((kind, body)) = relay.into_relay() else {
                return;
            };
            let Ok(room_id) = RoomId::new(body.room_id) else {
                push_invalid_room(state, connection).await;
                return;
            };

            RelayEventUseCase::new(state.registry.clone())
                .execute(connection, &profile, kind, room_id, body.payload)
                .await;
        }
    }
}

async fn push(state: &Arc<AppState>, connection: &ConnectionId, message: &ServerMessage) {
    match state.registry.sender_of(connection).await {
        Some(sender) => {
            if sender.send(message.to_json()).is_err() {
                tracing::warn!(connection = %connection, "failed to push message to connection");
            }
        }
        None => {
            tracing::debug!(connection = %connection, "push to unregistered connection dropped");
        }
    }
}

async fn push_authentication_required(state: &Arc<AppState>, connection: &ConnectionId) {
    push(
        state,
        connection,
        &ServerMessage::Error {
            message: "authentication required".to_string(),
        },
    )
    .await;
}

async fn push_invalid_room(state: &Arc<AppState>, connection: &ConnectionId) {
    push(
        state,
        connection,
        &ServerMessage::Error {
            message: "invalid room id".to_string(),
        },
    )
    .await;
}
