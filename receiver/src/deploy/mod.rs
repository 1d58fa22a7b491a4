//! Deployment module

pub mod report;
pub mod runner;

use std::path::PathBuf;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;

use crate::errors::ReceiverError;
use crate::settings::{
    Settings, DEFAULT_BRANCH, DEFAULT_DATE_FORMAT, DEFAULT_DIRECTORY, DEFAULT_REMOTE,
    DEFAULT_TIMEZONE,
};
use crate::telemetry;

/// Validated deployment configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Canonical working directory holding the checkout
    pub directory: PathBuf,

    /// Branch whose pushes trigger a deployment
    pub branch: String,

    /// Remote to fetch and pull from
    pub remote: String,

    /// Report recipient address, empty disables delivery
    pub email: String,

    /// Display timezone for report timestamps
    pub timezone: Tz,

    /// Timestamp format for report entries
    pub date_format: String,

    /// Upper bound on a single synchronization command
    pub step_timeout: Duration,

    /// Server identity used in report subjects and the opening log line
    pub server_name: String,
}

impl DeployConfig {
    /// Build the configuration from loaded settings. The working directory
    /// must exist and resolve to an absolute path; the timezone and the
    /// timestamp format must parse. Empty-valued settings fall back to their
    /// defaults.
    pub fn new(settings: &Settings) -> Result<Self, ReceiverError> {
        let directory = non_empty_or(&settings.directory, DEFAULT_DIRECTORY);
        let directory = std::fs::canonicalize(directory).map_err(|e| {
            ReceiverError::ConfigError(format!(
                "working directory [{}] is not usable: {}",
                settings.directory, e
            ))
        })?;

        let timezone: Tz = non_empty_or(&settings.timezone, DEFAULT_TIMEZONE)
            .parse()
            .map_err(|e| ReceiverError::ConfigError(format!("unrecognized timezone: {}", e)))?;

        let date_format = non_empty_or(&settings.date_format, DEFAULT_DATE_FORMAT).to_string();
        if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ReceiverError::ConfigError(format!(
                "invalid date format [{}]",
                date_format
            )));
        }

        let server_name = match settings.server_name.trim() {
            "" => telemetry::hostname(),
            name => name.to_string(),
        };

        Ok(Self {
            directory,
            branch: non_empty_or(&settings.branch, DEFAULT_BRANCH).to_string(),
            remote: non_empty_or(&settings.remote, DEFAULT_REMOTE).to_string(),
            email: settings.email.trim().to_string(),
            timezone,
            date_format,
            step_timeout: Duration::from_secs(settings.step_timeout_secs),
            server_name,
        })
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_fall_back_to_defaults() {
        let mut settings = Settings::default();
        settings.branch = String::new();
        settings.remote = "  ".to_string();
        settings.timezone = String::new();
        settings.date_format = String::new();

        let config = DeployConfig::new(&settings).unwrap();
        assert_eq!(config.branch, "master");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.timezone, chrono_tz::Europe::Minsk);
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
        assert!(config.directory.is_absolute());
        assert!(!config.server_name.is_empty());
    }

    #[test]
    fn test_missing_directory_is_rejected() {
        let mut settings = Settings::default();
        settings.directory = "/definitely/not/a/real/checkout".to_string();
        assert!(DeployConfig::new(&settings).is_err());
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let mut settings = Settings::default();
        settings.timezone = "Atlantis/Lost_City".to_string();
        assert!(DeployConfig::new(&settings).is_err());
    }

    #[test]
    fn test_invalid_date_format_is_rejected() {
        let mut settings = Settings::default();
        settings.date_format = "%Q broken".to_string();
        assert!(DeployConfig::new(&settings).is_err());
    }
}
