//! Diagnostic output for the command-line tool.
//!
//! Library code logs through the `log` facade. The binary installs a
//! `tracing-subscriber` formatter on stderr, which also forwards `log`
//! records, so stdout stays reserved for the artefact path.

use std::env;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt};

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("failed to parse log filter {directive}: {source}")]
    ParseFilter {
        /// The rejected directive.
        directive: String,
        /// Parser diagnostic.
        source: tracing_subscriber::filter::ParseError,
    },
    /// A global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    SubscriberInstall(Box<dyn std::error::Error + Send + Sync>),
}

/// Map the command-line verbosity flags to a filter directive.
///
/// `quiet` wins over any number of `-v` flags.
#[must_use]
pub fn default_directive(verbosity: u8, quiet: bool) -> &'static str {
    match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG`, when set, takes precedence over the command-line flags.
///
/// # Errors
///
/// Returns [`LoggingError::ParseFilter`] for an invalid directive and
/// [`LoggingError::SubscriberInstall`] if a subscriber is already installed.
pub fn init_logging(verbosity: u8, quiet: bool) -> Result<(), LoggingError> {
    let directive = env::var(EnvFilter::DEFAULT_ENV)
        .unwrap_or_else(|_| default_directive(verbosity, quiet).to_owned());
    let filter = EnvFilter::try_new(&directive).map_err(|source| LoggingError::ParseFilter {
        directive: directive.clone(),
        source,
    })?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(LoggingError::SubscriberInstall)
}
