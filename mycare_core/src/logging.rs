//! Diagnostics for the `mycare` binary.
//!
//! Stdout carries the JSON a caller parses, so every log line goes to
//! stderr. Our own crates log at `info` by default and dependencies only
//! at `warn`. `RUST_LOG` replaces the whole default filter.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn,mycare_core=info,mycare=info";

/// Install the stderr subscriber with [`DEFAULT_FILTER`]
pub fn init() {
    init_with_filter(DEFAULT_FILTER)
}

/// Install the stderr subscriber with the given filter directives.
///
/// Does nothing if a global subscriber is already set, e.g. when the core is
/// embedded in a host that configured its own.
pub fn init_with_filter(directives: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    let stderr = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    if tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("Subscriber already installed, keeping it");
    }
}

/// Route logs through the test harness so they show up on failures
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
