//! Tracing subscriber setup for the binary.
//!
//! `RUST_LOG` wins when set. Otherwise the `-v` count picks the level for
//! the `sume` target. Output goes to stderr so stdout carries only results.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter directive for a verbosity count. Quiet mode only shows errors.
pub fn directive(verbosity: u8, quiet: bool) -> String {
    let level = if quiet {
        "error"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    format!("sume={}", level)
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbosity, quiet)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
