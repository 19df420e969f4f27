use crate::config::LOG_ENV;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Diagnostics go to stderr so listings on
/// stdout stay clean; the level comes from `JOTTERXPRESS_LOG` (default warn).
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
