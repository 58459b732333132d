//! Logging setup.
//!
//! Library code only emits `tracing` events; binaries and tests opt into
//! printing them with one of these helpers.

use tracing_subscriber::EnvFilter;

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install a human-readable `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_directive` when set. Returns `false` if a
/// global subscriber was already installed, in which case nothing changes.
///
/// ```rust
/// chatstream::telemetry::init_tracing("chatstream=debug");
/// // A second call is harmless.
/// assert!(!chatstream::telemetry::init_tracing("chatstream=trace"));
/// ```
pub fn init_tracing(default_directive: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Install a subscriber that writes one JSON object per event.
///
/// Same filtering and idempotence as [`init_tracing`].
pub fn init_json_tracing(default_directive: &str) -> bool {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(default_directive))
        .with_current_span(false)
        .try_init()
        .is_ok()
}
