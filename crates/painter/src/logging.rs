//! Logging setup for the binary.

use tracing_subscriber::EnvFilter;

/// Initialise logging to stderr.
///
/// `RUST_LOG` wins when set; otherwise `level` (from the config file) is
/// used. Calling this twice is harmless.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .try_init();
}
