//! Presence derivation and join/leave announcements.

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, ConnectionRegistry, RoomId, UserId, UserProfile},
    infrastructure::dto::websocket::ServerMessage,
};

use super::broadcast::RoomBroadcaster;

/// Derives online/offline state from registry lifecycle and announces
/// presence changes to the affected rooms.
#[derive(Clone)]
pub struct PresenceTracker {
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: RoomBroadcaster,
}

impl PresenceTracker {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        let broadcaster = RoomBroadcaster::new(registry.clone());
        Self {
            registry,
            broadcaster,
        }
    }

    /// Announce a presence join to each room, excluding the user's own new
    /// connection. Callers pass only the rooms the user was not already
    /// visible in (see [`crate::domain::BindOutcome`]).
    pub async fn announce_online(
        &self,
        profile: &UserProfile,
        rooms: &[RoomId],
        exclude: &ConnectionId,
    ) {
        let message = ServerMessage::UserOnline {
            user_id: profile.user_id.as_str().to_string(),
            display_name: profile.display_name.clone(),
            avatar_url: profile.avatar_url.clone(),
        }
        .to_json();
        for room_id in rooms {
            self.broadcaster
                .broadcast(room_id, &message, Some(exclude))
                .await;
        }
        tracing::info!(user_id = %profile.user_id, rooms = rooms.len(), "announced user online");
    }

    /// Announce a presence leave to each room. Invoked only when a user's
    /// last connection has been unregistered, with the de-duplicated union
    /// of rooms across that user's departed connections.
    pub async fn announce_offline(&self, user_id: &UserId, rooms: &[RoomId]) {
        let message = ServerMessage::UserOffline {
            user_id: user_id.as_str().to_string(),
        }
        .to_json();
        for room_id in rooms {
            self.broadcaster.broadcast(room_id, &message, None).await;
        }
        tracing::info!(user_id = %user_id, rooms = rooms.len(), "announced user offline");
    }

    /// Whether a presence record exists for the user.
    pub async fn is_online(&self, user_id: &UserId) -> bool {
        self.registry.is_online(user_id).await
    }

    /// Millisecond timestamp of the user's most recent activity, if online.
    pub async fn last_seen_of(&self, user_id: &UserId) -> Option<i64> {
        self.registry.last_seen_of(user_id).await
    }

    /// Snapshotted profiles of users currently visible in a room.
    pub async fn online_users_in(&self, room_id: &RoomId) -> Vec<UserProfile> {
        self.registry.online_users_in(room_id).await
    }
}
