//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout stays clean for `--json` and `inspect` output.
//! `RUST_LOG` wins over the level picked from the command line flags.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset
fn default_filter(debug: bool, quiet: bool) -> &'static str {
    if debug {
        "floodgate=debug,floodgate_sync=debug,floodgate_core=debug,info"
    } else if quiet {
        "error"
    } else {
        "info"
    }
}

/// Install the global subscriber
pub fn init(debug: bool, quiet: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(debug)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(debug, quiet)))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
