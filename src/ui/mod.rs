//! WebSocket/HTTP server surface of the real-time core.

mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{build_router, run, serve};
