//! In-memory ConnectionRegistry implementation.
//!
//! All state lives behind one `Mutex`, so every operation is atomic with
//! respect to concurrent register/unregister for the same connection. The
//! registry never reports a connection as subscribed after it has been
//! unregistered.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::UnboundedSender};

use crate::{
    domain::{
        BindOutcome, ConnectionId, ConnectionRegistry, RegistryError, RoomId, Unregistered,
        UserId, UserProfile,
    },
    time::now_millis,
};

/// Per-connection bookkeeping.
struct ConnectionEntry {
    sender: UnboundedSender<String>,
    user_id: Option<UserId>,
    rooms: HashSet<RoomId>,
}

/// Per-user presence record. Exists iff the user has at least one
/// registered connection.
struct PresenceEntry {
    /// Display snapshot taken at the user's first authentication of this
    /// presence span.
    profile: UserProfile,
    connections: HashSet<ConnectionId>,
    /// Union of rooms across connections that already unregistered. Used
    /// for the offline announcement when the last connection goes away.
    departed_rooms: HashSet<RoomId>,
    last_seen: i64,
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    presence: HashMap<UserId, PresenceEntry>,
}

/// Mutex-guarded in-memory registry. Process-wide singleton per server
/// instance.
pub struct InMemoryConnectionRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
        }
    }
}

impl Default for InMemoryConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted(rooms: &HashSet<RoomId>) -> Vec<RoomId> {
    let mut rooms: Vec<RoomId> = rooms.iter().cloned().collect();
    rooms.sort();
    rooms
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, connection: ConnectionId, sender: UnboundedSender<String>) {
        let mut state = self.state.lock().await;
        state.connections.insert(
            connection,
            ConnectionEntry {
                sender,
                user_id: None,
                rooms: HashSet::new(),
            },
        );
    }

    async fn bind(
        &self,
        connection: &ConnectionId,
        profile: UserProfile,
        rooms: Vec<RoomId>,
    ) -> Result<BindOutcome, RegistryError> {
        let mut state = self.state.lock().await;

        let user_id = profile.user_id.clone();
        let already_bound = match state.connections.get(connection) {
            Some(entry) => entry.user_id.is_some(),
            None => return Err(RegistryError::UnknownConnection(connection.clone())),
        };
        if already_bound {
            return Err(RegistryError::AlreadyBound(connection.clone()));
        }

        // Rooms where no other connection of this user is subscribed yet;
        // these are the ones a presence join must be announced for.
        let newly_present_rooms: Vec<RoomId> = {
            let sibling_rooms: HashSet<&RoomId> = state
                .presence
                .get(&user_id)
                .map(|presence| {
                    presence
                        .connections
                        .iter()
                        .filter_map(|sibling| state.connections.get(sibling))
                        .flat_map(|entry| entry.rooms.iter())
                        .collect()
                })
                .unwrap_or_default();
            rooms
                .iter()
                .filter(|room| !sibling_rooms.contains(room))
                .cloned()
                .collect()
        };

        let now = now_millis();
        if let Some(entry) = state.connections.get_mut(connection) {
            entry.user_id = Some(user_id.clone());
            entry.rooms = rooms.into_iter().collect();
        }

        let presence = state
            .presence
            .entry(user_id)
            .or_insert_with(|| PresenceEntry {
                profile,
                connections: HashSet::new(),
                departed_rooms: HashSet::new(),
                last_seen: now,
            });
        presence.connections.insert(connection.clone());
        presence.last_seen = now;

        Ok(BindOutcome {
            newly_present_rooms,
        })
    }

    async fn add_subscription(
        &self,
        connection: &ConnectionId,
        room_id: RoomId,
    ) -> Result<bool, RegistryError> {
        let mut state = self.state.lock().await;
        let entry = state
            .connections
            .get_mut(connection)
            .ok_or_else(|| RegistryError::UnknownConnection(connection.clone()))?;
        Ok(entry.rooms.insert(room_id))
    }

    async fn remove_subscription(
        &self,
        connection: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<bool, RegistryError> {
        let mut state = self.state.lock().await;
        let entry = state
            .connections
            .get_mut(connection)
            .ok_or_else(|| RegistryError::UnknownConnection(connection.clone()))?;
        Ok(entry.rooms.remove(room_id))
    }

    async fn unregister(&self, connection: &ConnectionId) -> Option<Unregistered> {
        let mut state = self.state.lock().await;
        let entry = state.connections.remove(connection)?;

        let rooms = sorted(&entry.rooms);
        let Some(user_id) = entry.user_id else {
            return Some(Unregistered {
                user: None,
                rooms,
                offline_rooms: None,
            });
        };

        let mut offline_rooms = None;
        let mut profile = None;
        if let Some(presence) = state.presence.get_mut(&user_id) {
            presence.connections.remove(connection);
            presence.departed_rooms.extend(entry.rooms.iter().cloned());
            presence.last_seen = now_millis();
            profile = Some(presence.profile.clone());
            if presence.connections.is_empty() {
                offline_rooms = Some(sorted(&presence.departed_rooms));
                state.presence.remove(&user_id);
            }
        }

        Some(Unregistered {
            user: profile,
            rooms,
            offline_rooms,
        })
    }

    async fn connections_for_user(&self, user_id: &UserId) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        state
            .presence
            .get(user_id)
            .map(|presence| presence.connections.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn connections_for_room(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        state
            .connections
            .iter()
            .filter(|(_, entry)| entry.rooms.contains(room_id))
            .map(|(connection, _)| connection.clone())
            .collect()
    }

    async fn is_subscribed(&self, connection: &ConnectionId, room_id: &RoomId) -> bool {
        let state = self.state.lock().await;
        state
            .connections
            .get(connection)
            .is_some_and(|entry| entry.rooms.contains(room_id))
    }

    async fn sender_of(&self, connection: &ConnectionId) -> Option<UnboundedSender<String>> {
        let state = self.state.lock().await;
        state
            .connections
            .get(connection)
            .map(|entry| entry.sender.clone())
    }

    async fn touch(&self, connection: &ConnectionId) {
        let mut state = self.state.lock().await;
        let Some(user_id) = state
            .connections
            .get(connection)
            .and_then(|entry| entry.user_id.clone())
        else {
            return;
        };
        if let Some(presence) = state.presence.get_mut(&user_id) {
            presence.last_seen = now_millis();
        }
    }

    async fn is_online(&self, user_id: &UserId) -> bool {
        let state = self.state.lock().await;
        state.presence.contains_key(user_id)
    }

    async fn last_seen_of(&self, user_id: &UserId) -> Option<i64> {
        let state = self.state.lock().await;
        state
            .presence
            .get(user_id)
            .map(|presence| presence.last_seen)
    }

    async fn online_users_in(&self, room_id: &RoomId) -> Vec<UserProfile> {
        let state = self.state.lock().await;
        let mut user_ids: Vec<&UserId> = state
            .connections
            .values()
            .filter(|entry| entry.rooms.contains(room_id))
            .filter_map(|entry| entry.user_id.as_ref())
            .collect();
        user_ids.sort();
        user_ids.dedup();
        user_ids
            .into_iter()
            .filter_map(|user_id| state.presence.get(user_id))
            .map(|presence| presence.profile.clone())
            .collect()
    }
}
