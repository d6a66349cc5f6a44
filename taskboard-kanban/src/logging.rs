//! Tracing setup and log formatting helpers.

use crate::config::LoggingConfig;
use serde::Serialize;
use std::fmt::Debug;
use tracing_subscriber::EnvFilter;

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured filter. Safe to call more than once;
/// later calls leave the first subscriber in place and return `false`.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(config.ansi)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

/// Wrapper for pretty-printing types in logs as YAML
///
/// ```ignore
/// use taskboard_kanban::logging::Pretty;
/// tracing::debug!("snapshot: {}", Pretty(&tasks));
/// ```
///
/// Debug formatting is used as a fallback if YAML serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}
