//! Tracing setup for the command line binary.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the `verbose` flag.
///
/// Logs go to stderr so exported data on stdout is never interleaved with them.
/// Calling this more than once is harmless.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "pocketbook=debug"
    } else {
        "pocketbook=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
