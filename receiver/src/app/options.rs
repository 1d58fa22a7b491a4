//! Application configuration options

use crate::deploy::DeployConfig;
use crate::settings::SmtpSettings;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Validated deployment configuration
    pub deploy: DeployConfig,

    /// Server configuration
    pub server: ServerOptions,

    /// SMTP relay configuration for outbound reports
    pub smtp: SmtpSettings,
}

/// Local HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}
