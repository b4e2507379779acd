//! Diagnostics on stderr
//!
//! Stdout carries replays, exports and prompts, so every log line goes to
//! stderr. `RUST_LOG` wins over the `--verbose` flag when set.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn default_level(verbose: bool) -> &'static str {
    if verbose { "session_replay=debug" } else { "warn" }
}

/// Initialize the global subscriber; later calls are no-ops
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time();

    let _ = tracing_subscriber::registry().with(filter).with(stderr_layer).try_init();

    tracing::debug!(verbose, "Logging initialized");
}

/// Initialize logging for tests (captured by the test harness)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false), "warn");
        assert_eq!(default_level(true), "session_replay=debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_test();
        init(false);
        init(true);
    }
}
