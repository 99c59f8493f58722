//! Handler modules for HTTP and WebSocket endpoints.

pub mod http;
pub mod websocket;

// Re-export HTTP handlers
pub use http::{get_room_online_users, get_user_presence, health_check, notify_user};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
