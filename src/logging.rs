//! Logging setup for the binary
//!
//! Logs go to stderr so they never mix with program output or protocol
//! events on stdout. `RUST_LOG` overrides the default filter.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with `default_filter` unless `RUST_LOG` is set
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second initialisation (tests, embedding) keeps the first subscriber
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
