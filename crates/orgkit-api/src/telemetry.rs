//! Tracing subscriber initialization.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber. Log level comes from RUST_LOG
/// (default `info`); production gets JSON lines for log shipping, everything
/// else a human-readable format. Safe to call more than once; later calls are
/// no-ops, which keeps tests from fighting over the global subscriber.
pub fn init_telemetry(environment: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let is_production =
        environment.eq_ignore_ascii_case("production") || environment.eq_ignore_ascii_case("prod");

    let result = if is_production {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber was already initialized");
    }
}
