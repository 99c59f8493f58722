//! Router assembly and server entry point.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    infrastructure::{
        collaborator::{self, DirectoryFixture, InMemoryDirectory, StaticIdentityVerifier},
        repository::InMemoryConnectionRegistry,
    },
    ui::{
        handler::{
            get_room_online_users, get_user_presence, health_check, notify_user,
            websocket_handler,
        },
        signal,
        state::AppState,
    },
};

/// Build the application router over the shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/presence/users/{user_id}", get(get_user_presence))
        .route(
            "/api/presence/rooms/{room_id}/online",
            get(get_room_online_users),
        )
        .route("/api/users/{user_id}/notify", post(notify_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router on an already-bound listener until a shutdown signal
/// arrives. Used directly by the integration tests.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(signal::shutdown_signal())
        .await
}

/// Assemble collaborators and state from the configuration and run the
/// server.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (verifier, directory) = match &config.directory {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await?;
            let fixture: DirectoryFixture = serde_json::from_str(&raw)?;
            collaborator::seed(fixture).await?
        }
        None => {
            tracing::warn!("no directory fixture provided; every authentication will fail");
            (StaticIdentityVerifier::new(), InMemoryDirectory::new())
        }
    };

    let directory = Arc::new(directory);
    let state = Arc::new(AppState::new(
        Arc::new(InMemoryConnectionRegistry::new()),
        Arc::new(verifier),
        directory.clone(),
        directory,
    ));

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    serve(listener, state).await?;
    Ok(())
}
