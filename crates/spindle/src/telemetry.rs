//! Tracing initialization for the `spindle` CLI.
//!
//! Logs go to stderr so command output on stdout stays pipeable. The filter
//! comes from `RUST_LOG` when set, otherwise from the configured level.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Call this once at startup, before any `tracing` events are emitted.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
