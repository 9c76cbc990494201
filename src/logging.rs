//! Diagnostic logging.
//!
//! Library code emits `tracing` events; the binary installs one stderr
//! subscriber. Status lines meant for the user go through
//! [`Output`](crate::output::Output) instead and are never mixed in here.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a filter directive, e.g. `lem=trace`.
pub const LOG_ENV: &str = "LEM_LOG";

/// Builds the filter: `$LEM_LOG` when set and valid, otherwise `debug` for
/// verbose runs and `warn` for everything else.
#[must_use]
pub fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    })
}

/// Installs the global subscriber writing to stderr.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbose: bool) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter(verbose))
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
