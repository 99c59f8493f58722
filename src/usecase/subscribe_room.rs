//! UseCase: subscribe a connection to an additional room.
//!
//! Requires a fresh membership check; a connection is never subscribed to
//! a room its user does not belong to at subscribe time.

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, MembershipStore, RoomId, UserId};

use super::error::SubscribeError;

pub struct SubscribeRoomUseCase {
    memberships: Arc<dyn MembershipStore>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl SubscribeRoomUseCase {
    pub fn new(memberships: Arc<dyn MembershipStore>, registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self {
            memberships,
            registry,
        }
    }

    /// Execute the subscribe transition for an authenticated connection.
    ///
    /// Returns `true` when the room was newly added to the connection's
    /// subscription set (a join should be announced), `false` when it was
    /// already subscribed. On `AccessDenied` the subscription set is left
    /// unchanged.
    pub async fn execute(
        &self,
        connection: &ConnectionId,
        user_id: &UserId,
        room_id: RoomId,
    ) -> Result<bool, SubscribeError> {
        if !self.memberships.is_member(user_id, &room_id).await {
            tracing::warn!(
                connection = %connection,
                user_id = %user_id,
                room_id = %room_id,
                "subscribe denied: not a member"
            );
            return Err(SubscribeError::AccessDenied(room_id));
        }

        match self.registry.add_subscription(connection, room_id).await {
            Ok(newly_subscribed) => Ok(newly_subscribed),
            // The connection vanished between the membership check and the
            // mutation; nothing is subscribed, nothing to announce.
            Err(err) => {
                tracing::debug!(connection = %connection, error = %err, "subscribe after disconnect");
                Ok(false)
            }
        }
    }
}
