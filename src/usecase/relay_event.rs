//! UseCase: relay a client-submitted domain event to a room.
//!
//! The invoking connection must currently be subscribed to the target
//! room; otherwise the relay is silently rejected (no error, no
//! broadcast). This blocks spoofed cross-room broadcasts — surfacing the
//! rejection would help neither a buggy client nor an attacker.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    domain::{ConnectionId, ConnectionRegistry, DomainEvent, EventKind, RoomId, Timestamp, UserProfile},
    infrastructure::dto::websocket::relay_to_json,
    time::now_millis,
};

use super::broadcast::RoomBroadcaster;

pub struct RelayEventUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: RoomBroadcaster,
}

impl RelayEventUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        let broadcaster = RoomBroadcaster::new(registry.clone());
        Self {
            registry,
            broadcaster,
        }
    }

    /// Relay one event from `connection` to the other subscribers of
    /// `room_id`, wrapped with the sending user's identity. Returns the
    /// number of connections the event was handed to.
    pub async fn execute(
        &self,
        connection: &ConnectionId,
        actor: &UserProfile,
        kind: EventKind,
        room_id: RoomId,
        payload: Map<String, Value>,
    ) -> usize {
        if !self.registry.is_subscribed(connection, &room_id).await {
            tracing::debug!(
                connection = %connection,
                room_id = %room_id,
                kind = %kind,
                "dropping relay from connection not subscribed to room"
            );
            return 0;
        }

        let event = DomainEvent::new(
            kind,
            room_id,
            payload,
            connection.clone(),
            Timestamp::new(now_millis()),
        );
        let message = relay_to_json(&event, actor);
        self.broadcaster
            .broadcast(&event.room_id, &message, Some(connection))
            .await
    }
}
