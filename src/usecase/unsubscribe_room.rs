//! UseCase: unsubscribe a connection from a room.
//!
//! Always permitted and idempotent: unsubscribing a room the connection is
//! not subscribed to is a complete no-op.

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, RoomId};

pub struct UnsubscribeRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl UnsubscribeRoomUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Execute the unsubscribe transition. Returns `true` when the room
    /// was actually removed (a leave should be announced), `false` for the
    /// no-op case.
    pub async fn execute(&self, connection: &ConnectionId, room_id: &RoomId) -> bool {
        match self.registry.remove_subscription(connection, room_id).await {
            Ok(removed) => removed,
            Err(err) => {
                tracing::debug!(connection = %connection, error = %err, "unsubscribe after disconnect");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{UserId, UserProfile},
        infrastructure::repository::InMemoryConnectionRegistry,
    };
    use tokio::sync::mpsc;

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_unsubscribe_twice_announces_once() {
        // given: a connection subscribed to p1
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = UnsubscribeRoomUseCase::new(registry.clone());
        let connection = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.register(connection.clone(), tx).await;
        registry
            .bind(
                &connection,
                UserProfile::new(UserId::new("u1".to_string()).unwrap(), "Alice".to_string(), None),
                vec![room("p1")],
            )
            .await
            .unwrap();

        // when: unsubscribing the same room twice
        let first = usecase.execute(&connection, &room("p1")).await;
        let second = usecase.execute(&connection, &room("p1")).await;

        // then: only the first removal warrants a leave broadcast
        assert!(first);
        assert!(!second);
        assert!(!registry.is_subscribed(&connection, &room("p1")).await);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_connection_is_noop() {
        // given:
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = UnsubscribeRoomUseCase::new(registry.clone());

        // when:
        let removed = usecase.execute(&ConnectionId::generate(), &room("p1")).await;

        // then:
        assert!(!removed);
    }
}
