//! Logger module
//!
//! Thin layer over `tracing`:
//! - Subscriber setup from the logging configuration (`RUST_LOG` takes precedence)
//! - Named helpers for server lifecycle and request events
//! - Access log lines under the `access` target

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

pub fn log_server_start(
    addr: &SocketAddr,
    picture_dir: &Path,
    picture_dir_exists: bool,
    config: &Config,
) {
    tracing::info!(
        address = %addr,
        pictures = %picture_dir.display(),
        workers = ?config.server.workers,
        max_connections = ?config.performance.max_connections,
        access_log = config.logging.access_log,
        "Picture server listening on http://{addr}"
    );
    if !picture_dir_exists {
        tracing::warn!(
            pictures = %picture_dir.display(),
            "Pictures directory does not exist yet; listing will fail until it is created"
        );
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    tracing::warn!(error = %err, "Failed to serve connection");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_traversal_blocked(name: &str) {
    tracing::warn!(name, "Path traversal attempt blocked");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown(active_connections: usize) {
    tracing::info!(active_connections, "Shutdown requested, no longer accepting connections");
}
