//! Domain entities for the real-time layer.
//!
//! The core owns no durable data. `UserProfile` is a display snapshot taken
//! at authentication time, `Membership` mirrors one row of the external
//! membership store, and `DomainEvent` is the immutable relay envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::value_object::{ConnectionId, RoomId, Timestamp, UserId};

/// Display snapshot of a user, captured when the user authenticates.
///
/// Not live-refreshed: a display-name change lands on the next
/// authentication, not mid-session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn new(user_id: UserId, display_name: String, avatar_url: Option<String>) -> Self {
        Self {
            user_id,
            display_name,
            avatar_url,
        }
    }
}

/// Role of a user within a room, as reported by the membership store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    #[default]
    Member,
}

/// One membership row: the user belongs to `room_id` with `role`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub room_id: RoomId,
    pub role: MemberRole,
}

impl Membership {
    pub fn new(room_id: RoomId, role: MemberRole) -> Self {
        Self { room_id, role }
    }
}

/// Kinds of client-submitted domain events the core relays.
///
/// The core never interprets the payload of these events; it only scopes
/// them to a room and re-delivers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    RetrospectiveItemCreated,
    RetrospectiveItemUpdated,
    RetrospectiveItemDeleted,
    CallInitiated,
    CallJoined,
    CallEnded,
    TypingStart,
    TypingStop,
}

impl EventKind {
    /// Wire name of the event, used as the `type` tag on both directions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskCreated => "task_created",
            Self::TaskUpdated => "task_updated",
            Self::TaskDeleted => "task_deleted",
            Self::RetrospectiveItemCreated => "retrospective_item_created",
            Self::RetrospectiveItemUpdated => "retrospective_item_updated",
            Self::RetrospectiveItemDeleted => "retrospective_item_deleted",
            Self::CallInitiated => "call_initiated",
            Self::CallJoined => "call_joined",
            Self::CallEnded => "call_ended",
            Self::TypingStart => "typing_start",
            Self::TypingStop => "typing_stop",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable envelope for a relayed domain event.
///
/// Never persisted; it exists only for the duration of one fan-out.
#[derive(Debug, Clone)]
pub struct DomainEvent {
    pub kind: EventKind,
    pub room_id: RoomId,
    pub payload: Map<String, Value>,
    pub origin: ConnectionId,
    pub emitted_at: Timestamp,
}

impl DomainEvent {
    pub fn new(
        kind: EventKind,
        room_id: RoomId,
        payload: Map<String, Value>,
        origin: ConnectionId,
        emitted_at: Timestamp,
    ) -> Self {
        Self {
            kind,
            room_id,
            payload,
            origin,
            emitted_at,
        }
    }
}
