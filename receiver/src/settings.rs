//! Settings file management

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;

use crate::errors::ReceiverError;
use crate::logs::LogLevel;

pub const DEFAULT_TIMEZONE: &str = "Europe/Minsk";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_REMOTE: &str = "origin";
/// chrono equivalent of the `Y-m-d H:i:sP` display format.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";
pub const DEFAULT_DIRECTORY: &str = ".";
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 300;

/// Receiver settings, read once at startup. Unknown keys are ignored;
/// empty-valued keys fall back to their defaults when the deployment
/// configuration is built.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Working directory holding the deployed checkout
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Display timezone for report timestamps
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Branch whose pushes trigger a deployment
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Remote to fetch and pull from
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Report recipient address, empty disables delivery
    #[serde(default)]
    pub email: String,

    /// Timestamp format for report entries (chrono strftime syntax)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Server identity used in report subjects, empty means hostname
    #[serde(default)]
    pub server_name: String,

    /// Upper bound on a single synchronization command, in seconds
    #[serde(default = "default_step_timeout")]
    pub step_timeout_secs: u64,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// SMTP configuration
    #[serde(default)]
    pub smtp: SmtpSettings,
}

fn default_directory() -> String {
    DEFAULT_DIRECTORY.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_remote() -> String {
    DEFAULT_REMOTE.to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_step_timeout() -> u64 {
    DEFAULT_STEP_TIMEOUT_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            directory: default_directory(),
            timezone: default_timezone(),
            branch: default_branch(),
            remote: default_remote(),
            email: String::new(),
            date_format: default_date_format(),
            server_name: String::new(),
            step_timeout_secs: default_step_timeout(),
            server: ServerSettings::default(),
            smtp: SmtpSettings::default(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. A missing file means all defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ReceiverError> {
        let path = path.as_ref();
        if tokio::fs::metadata(path).await.is_err() {
            return Ok(Self::default());
        }
        let contents = tokio::fs::read_to_string(path).await?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// SMTP relay settings for outbound reports
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    /// Relay host. When absent, reports are dropped with a warning.
    #[serde(default)]
    pub host: Option<String>,

    /// Relay port
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Relay username
    #[serde(default)]
    pub user: Option<String>,

    /// Relay password
    #[serde(default)]
    pub pass: Option<SecretString>,

    /// Fixed sender address
    #[serde(default = "default_sender")]
    pub from: String,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_sender() -> String {
    "NoReply <noreply@localhost>".to_string()
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: default_smtp_port(),
            user: None,
            pass: None,
            from: default_sender(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.branch, "master");
        assert_eq!(settings.remote, "origin");
        assert_eq!(settings.timezone, "Europe/Minsk");
        assert_eq!(settings.date_format, DEFAULT_DATE_FORMAT);
        assert_eq!(settings.step_timeout_secs, 300);
        assert!(settings.email.is_empty());
        assert!(settings.smtp.host.is_none());
    }

    #[test]
    fn test_unrecognized_keys_are_ignored() {
        let settings: Settings =
            serde_json::from_str(r#"{"branch": "release", "frobnicate": true}"#).unwrap();
        assert_eq!(settings.branch, "release");
    }

    #[test]
    fn test_nested_sections_deserialize() {
        let raw = r#"{
            "server": {"host": "0.0.0.0", "port": 9000},
            "smtp": {"host": "mail.example.com", "user": "deploy", "pass": "hunter2"}
        }"#;
        let settings: Settings = serde_json::from_str(raw).unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.smtp.host.as_deref(), Some("mail.example.com"));
        assert_eq!(settings.smtp.port, 587);
        assert!(settings.smtp.pass.is_some());
    }
}
