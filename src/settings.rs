use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::retry::RetryPolicy;
use crate::utils::parse_log_level;

/// Settings file used when `--settings` is not given.
pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("retry_backoff_seconds must be a finite, non-negative number (got {0})")]
    InvalidBackoff(f64),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub log_level: String,
    pub max_retries: u32,
    pub retry_backoff_seconds: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("data/input_sample.json"),
            output_file: PathBuf::from("data/output_example.json"),
            log_level: "INFO".to_string(),
            max_retries: 3,
            retry_backoff_seconds: 1.5,
        }
    }
}

/// Where the effective settings came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsOrigin {
    File(PathBuf),
    Defaults { missing: PathBuf },
}

impl Settings {
    /// Reads settings from `path`, or returns the built-in defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<(Self, SettingsOrigin), SettingsError> {
        if !path.exists() {
            return Ok((
                Self::default(),
                SettingsOrigin::Defaults {
                    missing: path.to_path_buf(),
                },
            ));
        }

        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok((settings, SettingsOrigin::File(path.to_path_buf())))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.retry_backoff_seconds.is_finite() || self.retry_backoff_seconds < 0.0 {
            return Err(SettingsError::InvalidBackoff(self.retry_backoff_seconds));
        }
        Ok(())
    }

    pub fn level_filter(&self) -> LevelFilter {
        parse_log_level(&self.log_level)
    }

    /// Only meaningful after [`Settings::validate`] has passed.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::try_from_secs_f64(self.retry_backoff_seconds).unwrap_or_default(),
        )
    }
}
