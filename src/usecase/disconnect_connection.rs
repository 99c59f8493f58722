//! UseCase: tear down a disconnected connection.
//!
//! Disconnect is unconditional: registry state is purged immediately, and
//! if this was the user's last connection the offline announcement goes to
//! the union of rooms across all of that user's departed connections.

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, Unregistered};

use super::presence::PresenceTracker;

pub struct DisconnectConnectionUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    presence: PresenceTracker,
}

impl DisconnectConnectionUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        let presence = PresenceTracker::new(registry.clone());
        Self { registry, presence }
    }

    /// Execute the teardown. Returns `None` if the connection was never
    /// registered (or was already torn down).
    pub async fn execute(&self, connection: &ConnectionId) -> Option<Unregistered> {
        let gone = self.registry.unregister(connection).await?;

        if let (Some(profile), Some(offline_rooms)) = (&gone.user, &gone.offline_rooms) {
            self.presence
                .announce_offline(&profile.user_id, offline_rooms)
                .await;
        }

        tracing::info!(
            connection = %connection,
            user_id = gone.user.as_ref().map(|p| p.user_id.as_str()).unwrap_or("-"),
            last_connection = gone.offline_rooms.is_some(),
            "connection unregistered"
        );

        Some(gone)
    }
}
