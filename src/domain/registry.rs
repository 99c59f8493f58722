//! Port for the in-memory connection registry.
//!
//! The registry is the single source of truth for "is this connection
//! live", which user it is bound to and which rooms it is subscribed to.
//! Every implementation must make each operation atomic with respect to
//! concurrent register/unregister for the same connection (single lock or
//! single-writer task); the invariants in the use case layer rely on it.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::entity::UserProfile;
use super::error::RegistryError;
use super::value_object::{ConnectionId, RoomId, UserId};

/// Result of binding a verified user to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOutcome {
    /// Rooms from the snapshot in which the user previously had no
    /// subscribed connection. Presence joins are announced for these only,
    /// so a second tab does not re-announce rooms the user is already
    /// visible in.
    pub newly_present_rooms: Vec<RoomId>,
}

/// State handed back when a connection is unregistered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unregistered {
    /// Profile the connection was bound to, if it had authenticated.
    pub user: Option<UserProfile>,
    /// Rooms the connection was subscribed to at teardown, sorted.
    pub rooms: Vec<RoomId>,
    /// `Some` iff this was the user's last connection: the de-duplicated
    /// union of rooms across all of that user's now-gone connections,
    /// sorted. The presence record is deleted at the same instant.
    pub offline_rooms: Option<Vec<RoomId>>,
}

/// In-memory mapping of authenticated user to active connections and of
/// connection to subscribed rooms.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Add a connection in unauthenticated state. Bookkeeping only.
    async fn register(&self, connection: ConnectionId, sender: UnboundedSender<String>);

    /// Attach a verified user and the initial room snapshot to a
    /// connection. Fails with [`RegistryError::AlreadyBound`] if the
    /// connection already carries a binding, and with
    /// [`RegistryError::UnknownConnection`] if it disconnected while the
    /// caller was suspended on an external lookup.
    async fn bind(
        &self,
        connection: &ConnectionId,
        profile: UserProfile,
        rooms: Vec<RoomId>,
    ) -> Result<BindOutcome, RegistryError>;

    /// Add one room to the connection's subscription set. Idempotent;
    /// returns `true` when the room was newly added.
    async fn add_subscription(
        &self,
        connection: &ConnectionId,
        room_id: RoomId,
    ) -> Result<bool, RegistryError>;

    /// Remove one room from the connection's subscription set. Idempotent;
    /// returns `true` when the room was actually removed.
    async fn remove_subscription(
        &self,
        connection: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<bool, RegistryError>;

    /// Remove the connection entirely. Returns `None` if it was never
    /// registered (or already unregistered).
    async fn unregister(&self, connection: &ConnectionId) -> Option<Unregistered>;

    /// All connections currently bound to the user (tabs/devices).
    async fn connections_for_user(&self, user_id: &UserId) -> Vec<ConnectionId>;

    /// All connections currently subscribed to the room. Resolved fresh on
    /// every call; callers must not cache the result across broadcasts.
    async fn connections_for_room(&self, room_id: &RoomId) -> Vec<ConnectionId>;

    /// Whether the connection is currently subscribed to the room.
    async fn is_subscribed(&self, connection: &ConnectionId, room_id: &RoomId) -> bool;

    /// Outbound channel of a live connection.
    async fn sender_of(&self, connection: &ConnectionId) -> Option<UnboundedSender<String>>;

    /// Record activity for the user the connection is bound to. No-op for
    /// unauthenticated connections.
    async fn touch(&self, connection: &ConnectionId);

    /// Whether a presence record exists for the user.
    async fn is_online(&self, user_id: &UserId) -> bool;

    /// Millisecond timestamp of the user's most recent activity. `None`
    /// once the presence record is gone.
    async fn last_seen_of(&self, user_id: &UserId) -> Option<i64>;

    /// Snapshotted profiles of every user with at least one connection
    /// subscribed to the room, sorted by user id.
    async fn online_users_in(&self, room_id: &RoomId) -> Vec<UserProfile>;
}
