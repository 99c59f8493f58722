//! Real-time presence and room-broadcast coordination layer.
//!
//! Authenticates live WebSocket connections against stored identity,
//! tracks which users are online and which project rooms they belong to,
//! and fans out task/retrospective/call events to the connections
//! subscribed to the affected room.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logger;
pub mod time;
pub mod ui;
pub mod usecase;

// Re-export the server entry point
pub use ui::run as run_server;
