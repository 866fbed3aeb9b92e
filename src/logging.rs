//! Tracing subscriber setup for hosts and demos.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, or by `default_directive`
/// (e.g. `"variant_bucketing=info"`) when `RUST_LOG` is unset or invalid.
///
/// Returns `false` if a global subscriber was already installed, which makes
/// repeated calls harmless.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
