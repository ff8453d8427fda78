//! Tracing setup for the CLI: `RUST_LOG` filter, human-readable lines on stderr.
//!
//! Default level is `warn`; `--verbose` raises the crate's own events to `info`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,sdlc=info,cli=info"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init(verbose: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(filter),
        )
        .try_init();
}
