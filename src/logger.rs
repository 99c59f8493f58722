//! Tracing subscriber setup shared by binaries and integration tests.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise the given crate/binary
/// name is filtered at `default_level` and tower-http request traces at
/// `info`.
pub fn setup_logger(name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{default_level},{name}={default_level},tower_http=info"
        ))
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
