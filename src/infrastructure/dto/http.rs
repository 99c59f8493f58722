//! HTTP API response DTOs for the presence query surface.

use serde::{Deserialize, Serialize};

/// Online/offline status of one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceStatusDto {
    pub user_id: String,
    pub online: bool,
    /// RFC 3339 instant of the user's most recent activity, while online.
    pub last_seen: Option<String>,
}

/// One online member of a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineUserDto {
    pub user_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Result of pushing a notification to a user's connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyResponseDto {
    /// Number of connections the notification was handed to.
    pub delivered: usize,
}
