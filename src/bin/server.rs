//! Real-time presence and room-broadcast server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server -- --directory fixtures/directory.json
//! ```

use clap::Parser;

use relay_hub::{config::ServerConfig, logger::setup_logger};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = relay_hub::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
