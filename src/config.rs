//! Server configuration parsed from the command line.

use std::path::PathBuf;

use clap::Parser;

/// Options for the relay-hub server binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "relay-hub-server", about = "Real-time presence and room-broadcast server")]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Default log level when RUST_LOG is not set.
    #[arg(long, default_value = "debug")]
    pub log_level: String,

    /// JSON fixture describing tokens, users and memberships for the
    /// in-memory collaborators. Without it the server starts empty and no
    /// connection can authenticate.
    #[arg(long)]
    pub directory: Option<PathBuf>,
}
