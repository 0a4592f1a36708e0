//! Logging integration for stratum.
//!
//! Provides a helper for configuring [`tracing`]-based logging from
//! [`Config`](crate::config::Config).

use crate::config::Config;

/// Sets up the global tracing subscriber based on the given configuration.
///
/// The log filter is read from `config.log_level` (e.g. "debug", "info",
/// "stratum=debug"). In debug mode a pretty, human-readable format is used;
/// otherwise a structured JSON format is used.
pub fn setup_logging(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}
