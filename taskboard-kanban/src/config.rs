//! Board configuration loaded with Figment
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//! 1. Default values
//! 2. A `taskboard.{toml,yaml,yml,json}` file, when present
//! 3. Environment variables prefixed `TASKBOARD_`, nested with `__`
//!    (e.g. `TASKBOARD_ORDERING__STEP=500`)

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Base name of the configuration file looked up in the working directory
pub const CONFIG_FILE_STEM: &str = "taskboard";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "TASKBOARD_";

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration parsing failed
    #[error("failed to parse configuration: {source}")]
    Parse {
        #[source]
        source: Box<figment::Error>,
    },

    /// Configuration validation failed
    #[error("invalid configuration value for '{key}': {message}")]
    Invalid { key: String, message: String },

    /// Configuration file format not supported
    #[error("unsupported configuration file format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Parse {
            source: Box::new(error),
        }
    }
}

/// Order key generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    /// Gap left between consecutive appended tasks
    pub step: f64,
    /// Renumber a column when a midpoint key can no longer be represented
    pub rebalance: bool,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            step: 1000.0,
            rebalance: true,
        }
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: false,
        }
    }
}

/// Top-level configuration for a board client
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub ordering: OrderingConfig,
    pub logging: LoggingConfig,
}

impl BoardConfig {
    /// Load configuration from defaults, a config file in the current directory, and env
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::current_dir()
            .ok()
            .and_then(|dir| discover_config_file(&dir));
        Self::load_with(file.as_deref())
    }

    /// Load configuration using an explicit file (or none) plus env overrides
    pub fn load_with(file: Option<&Path>) -> Result<Self, ConfigError> {
        let config: BoardConfig = Self::figment(file)?.extract()?;
        config.validate()?;
        debug!(
            step = config.ordering.step,
            rebalance = config.ordering.rebalance,
            "loaded board configuration"
        );
        Ok(config)
    }

    /// Build the figment with all sources in precedence order
    pub fn figment(file: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(BoardConfig::default()));

        if let Some(path) = file {
            trace!("merging configuration file {}", path.display());
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => {
                    return Err(ConfigError::UnsupportedFormat {
                        path: path.to_path_buf(),
                    })
                }
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Reject values the ordering engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ordering.step.is_finite() || self.ordering.step <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "ordering.step".into(),
                message: format!("must be a positive number, got {}", self.ordering.step),
            });
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "logging.filter".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Find the first `taskboard.*` config file in `dir`
pub fn discover_config_file(dir: &Path) -> Option<PathBuf> {
    ["toml", "yaml", "yml", "json"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", CONFIG_FILE_STEM, ext)))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_defaults() {
        let config = BoardConfig::load_with(None).unwrap();
        assert_eq!(config.ordering.step, 1000.0);
        assert!(config.ordering.rebalance);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    #[serial]
    fn test_toml_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("taskboard.toml");
        std::fs::write(&path, "[ordering]\nstep = 250.0\nrebalance = false\n").unwrap();

        let config = BoardConfig::load_with(Some(&path)).unwrap();
        assert_eq!(config.ordering.step, 250.0);
        assert!(!config.ordering.rebalance);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("taskboard.yaml");
        std::fs::write(&path, "logging:\n  filter: warn\n").unwrap();

        std::env::set_var("TASKBOARD_LOGGING__FILTER", "debug");
        let result = BoardConfig::load_with(Some(&path));
        std::env::remove_var("TASKBOARD_LOGGING__FILTER");

        assert_eq!(result.unwrap().logging.filter, "debug");
    }

    #[test]
    #[serial]
    fn test_invalid_step_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("taskboard.json");
        std::fs::write(&path, r#"{"ordering": {"step": 0}}"#).unwrap();

        let err = BoardConfig::load_with(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "ordering.step"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = BoardConfig::figment(Some(Path::new("taskboard.ini"))).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_discover_prefers_toml() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("taskboard.json"), "{}").unwrap();
        std::fs::write(temp.path().join("taskboard.toml"), "").unwrap();

        let found = discover_config_file(temp.path()).unwrap();
        assert!(found.ends_with("taskboard.toml"));
        assert!(discover_config_file(&temp.path().join("missing")).is_none());
    }
}
