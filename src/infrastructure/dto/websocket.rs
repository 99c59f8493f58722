//! WebSocket protocol messages.
//!
//! Both directions are internally tagged JSON (`"type"` discriminator).
//! Relayed domain events keep the client payload spread at the top level of
//! the outbound object, with the `type` tag and `acting_user` attached by
//! the server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::{DomainEvent, EventKind, UserProfile};

/// Body shared by every relay message: the target room plus whatever
/// payload fields the client attached. The core does not interpret the
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayBody {
    pub room_id: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Messages a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Authenticate { token: String },
    Subscribe { room_id: String },
    Unsubscribe { room_id: String },
    Ping,
    TaskCreated(RelayBody),
    TaskUpdated(RelayBody),
    TaskDeleted(RelayBody),
    RetrospectiveItemCreated(RelayBody),
    RetrospectiveItemUpdated(RelayBody),
    RetrospectiveItemDeleted(RelayBody),
    CallInitiated(RelayBody),
    CallJoined(RelayBody),
    CallEnded(RelayBody),
    TypingStart(RelayBody),
    TypingStop(RelayBody),
}

impl ClientMessage {
    /// Split a relay message into its event kind and body. Returns `None`
    /// for protocol messages (authenticate, subscribe, ping, ...).
    pub fn into_relay(self) -> Option<(EventKind, RelayBody)> {
        match self {
            Self::TaskCreated(body) => Some((EventKind::TaskCreated, body)),
            Self::TaskUpdated(body) => Some((EventKind::TaskUpdated, body)),
            Self::TaskDeleted(body) => Some((EventKind::TaskDeleted, body)),
            Self::RetrospectiveItemCreated(body) => {
                Some((EventKind::RetrospectiveItemCreated, body))
            }
            Self::RetrospectiveItemUpdated(body) => {
                Some((EventKind::RetrospectiveItemUpdated, body))
            }
            Self::RetrospectiveItemDeleted(body) => {
                Some((EventKind::RetrospectiveItemDeleted, body))
            }
            Self::CallInitiated(body) => Some((EventKind::CallInitiated, body)),
            Self::CallJoined(body) => Some((EventKind::CallJoined, body)),
            Self::CallEnded(body) => Some((EventKind::CallEnded, body)),
            Self::TypingStart(body) => Some((EventKind::TypingStart, body)),
            Self::TypingStop(body) => Some((EventKind::TypingStop, body)),
            _ => None,
        }
    }
}

/// Display fields of a user as pushed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<&UserProfile> for UserDto {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.user_id.as_str().to_string(),
            display_name: profile.display_name.clone(),
            avatar_url: profile.avatar_url.clone(),
        }
    }
}

/// Messages the server pushes to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Authenticated {
        user: UserDto,
    },
    AuthError {
        message: String,
    },
    Error {
        message: String,
    },
    Pong,
    JoinedRoom {
        room_id: String,
    },
    LeftRoom {
        room_id: String,
    },
    UserJoinedRoom {
        room_id: String,
        user_id: String,
        display_name: String,
    },
    UserLeftRoom {
        room_id: String,
        user_id: String,
    },
    UserOnline {
        user_id: String,
        display_name: String,
        avatar_url: Option<String>,
    },
    UserOffline {
        user_id: String,
    },
    Notification {
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
}

impl ServerMessage {
    /// Serialize to the wire representation.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("server message serializes to JSON")
    }
}

/// Render a relayed domain event for the wire, enriched with the acting
/// user's identity.
pub fn relay_to_json(event: &DomainEvent, actor: &UserProfile) -> String {
    let mut object = event.payload.clone();
    object.insert("type".to_string(), json!(event.kind.as_str()));
    object.insert("room_id".to_string(), json!(event.room_id.as_str()));
    object.insert("emitted_at".to_string(), json!(event.emitted_at.value()));
    object.insert(
        "acting_user".to_string(),
        json!({
            "id": actor.user_id.as_str(),
            "display_name": actor.display_name,
        }),
    );
    Value::Object(object).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, RoomId, Timestamp, UserId};

    #[test]
    fn test_parse_authenticate() {
        // given:
        let raw = r#"{"type":"authenticate","token":"tok-1"}"#;

        // when:
        let message: ClientMessage = serde_json::from_str(raw).unwrap();

        // then:
        assert!(matches!(message, ClientMessage::Authenticate { token } if token == "tok-1"));
    }

    #[test]
    fn test_parse_relay_with_flattened_payload() {
        // given:
        let raw = r#"{"type":"task_updated","room_id":"p1","task":{"id":7,"title":"Fix build"}}"#;

        // when:
        let message: ClientMessage = serde_json::from_str(raw).unwrap();
        let (kind, body) = message.into_relay().unwrap();

        // then:
        assert_eq!(kind, EventKind::TaskUpdated);
        assert_eq!(body.room_id, "p1");
        assert_eq!(body.payload["task"]["title"], "Fix build");
    }

    #[test]
    fn test_parse_ping() {
        // when:
        let message: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();

        // then:
        assert!(matches!(message, ClientMessage::Ping));
        assert!(ClientMessage::Ping.into_relay().is_none());
    }

    #[test]
    fn test_server_message_tagging() {
        // given:
        let message = ServerMessage::UserOnline {
            user_id: "u1".to_string(),
            display_name: "Alice".to_string(),
            avatar_url: None,
        };

        // when:
        let value: Value = serde_json::from_str(&message.to_json()).unwrap();

        // then:
        assert_eq!(value["type"], "user_online");
        assert_eq!(value["user_id"], "u1");
        assert_eq!(value["display_name"], "Alice");
    }

    #[test]
    fn test_relay_to_json_enriches_payload() {
        // given:
        let mut payload = Map::new();
        payload.insert("task".to_string(), json!({"id": 7}));
        let event = DomainEvent::new(
            EventKind::TaskUpdated,
            RoomId::new("p1".to_string()).unwrap(),
            payload,
            ConnectionId::generate(),
            Timestamp::new(1_000),
        );
        let actor = UserProfile::new(
            UserId::new("u1".to_string()).unwrap(),
            "Alice".to_string(),
            None,
        );

        // when:
        let value: Value = serde_json::from_str(&relay_to_json(&event, &actor)).unwrap();

        // then: payload spread at top level, type tag and acting user added
        assert_eq!(value["type"], "task_updated");
        assert_eq!(value["room_id"], "p1");
        assert_eq!(value["task"]["id"], 7);
        assert_eq!(value["acting_user"]["id"], "u1");
        assert_eq!(value["acting_user"]["display_name"], "Alice");
    }
}
