//! HTTP query surface for the CRUD layer.
//!
//! Lets the request/response side of the application render presence
//! indicators and push notifications without holding a WebSocket itself.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Map, Value};

use crate::{
    domain::{RoomId, UserId},
    infrastructure::dto::{
        http::{NotifyResponseDto, OnlineUserDto, PresenceStatusDto},
        websocket::ServerMessage,
    },
    ui::state::AppState,
    usecase::{PresenceTracker, RoomBroadcaster},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Whether the user currently has any registered connection.
pub async fn get_user_presence(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PresenceStatusDto>, StatusCode> {
    let user_id = UserId::new(user_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    let tracker = PresenceTracker::new(state.registry.clone());
    let online = tracker.is_online(&user_id).await;
    let last_seen = tracker
        .last_seen_of(&user_id)
        .await
        .map(crate::time::millis_to_rfc3339);
    Ok(Json(PresenceStatusDto {
        user_id: user_id.into_string(),
        online,
        last_seen,
    }))
}

/// Users currently visible in a room, with their display snapshots.
pub async fn get_room_online_users(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<OnlineUserDto>>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    let online = PresenceTracker::new(state.registry.clone())
        .online_users_in(&room_id)
        .await;
    Ok(Json(
        online
            .iter()
            .map(|profile| OnlineUserDto {
                user_id: profile.user_id.as_str().to_string(),
                display_name: profile.display_name.clone(),
                avatar_url: profile.avatar_url.clone(),
            })
            .collect(),
    ))
}

/// Push an application notification to every connection of one user.
pub async fn notify_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<NotifyResponseDto>, StatusCode> {
    let user_id = UserId::new(user_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    let message = ServerMessage::Notification { payload }.to_json();
    let delivered = RoomBroadcaster::new(state.registry.clone())
        .send_to_user(&user_id, &message)
        .await;
    Ok(Json(NotifyResponseDto { delivered }))
}
