//! Room-scoped fan-out of serialized messages.

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, RoomId, UserId};

/// Delivers an event to every connection subscribed to a room.
///
/// The target set is resolved at call time; nothing is cached across
/// calls. Delivery is fire-and-forget per connection: a closed transport
/// is logged and skipped, never surfaced to the caller. Ordering is only
/// guaranteed per destination connection (one mpsc channel each).
#[derive(Clone)]
pub struct RoomBroadcaster {
    registry: Arc<dyn ConnectionRegistry>,
}

impl RoomBroadcaster {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Send `message` to every subscriber of `room_id`, optionally
    /// excluding the originating connection. Returns how many connections
    /// the message was handed to.
    pub async fn broadcast(
        &self,
        room_id: &RoomId,
        message: &str,
        exclude: Option<&ConnectionId>,
    ) -> usize {
        let targets = self.registry.connections_for_room(room_id).await;
        let mut delivered = 0;
        for target in targets {
            if exclude == Some(&target) {
                continue;
            }
            if self.send_to_connection(&target, message).await {
                delivered += 1;
            } else {
                tracing::warn!(
                    room_id = %room_id,
                    connection = %target,
                    "skipping unreachable connection during broadcast"
                );
            }
        }
        delivered
    }

    /// Hand `message` to a single connection's outbound channel.
    pub async fn send_to_connection(&self, connection: &ConnectionId, message: &str) -> bool {
        match self.registry.sender_of(connection).await {
            Some(sender) => sender.send(message.to_string()).is_ok(),
            None => false,
        }
    }

    /// Push `message` to every connection of a user (all tabs/devices),
    /// independent of room subscriptions. Returns the delivery count.
    pub async fn send_to_user(&self, user_id: &UserId, message: &str) -> usize {
        let mut delivered = 0;
        for connection in self.registry.connections_for_user(user_id).await {
            if self.send_to_connection(&connection, message).await {
                delivered += 1;
            } else {
                tracing::warn!(
                    user_id = %user_id,
                    connection = %connection,
                    "skipping unreachable connection during user push"
                );
            }
        }
        delivered
    }
}
