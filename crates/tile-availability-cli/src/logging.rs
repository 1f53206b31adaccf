/*!
Logging initialization for the command line tool.

Log lines go to stderr so that query answers on stdout stay machine readable.
`RUST_LOG` is honoured; without it, release builds log at `info` and debug
builds at `debug`.
*/

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,tile_availability=debug"
    } else {
        "info"
    }
}

/// Install the global `tracing` subscriber
pub fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!("Logging initialized");
}
