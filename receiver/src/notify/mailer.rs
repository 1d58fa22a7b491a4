//! Deployment report delivery over SMTP.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::deploy::report::RunLog;
use crate::deploy::DeployConfig;
use crate::errors::ReceiverError;
use crate::settings::SmtpSettings;

/// Outbound sink for deployment reports.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the report, best-effort. Delivery failures are swallowed;
    /// the return value only says whether an attempt was handed to the
    /// transport.
    async fn send(&self, log: &RunLog, config: &DeployConfig) -> bool;
}

/// Report subject embedding the server identity and tracked branch.
pub fn subject(config: &DeployConfig) -> String {
    format!(
        "MONITOR: Deployment to server \"{}\" from \"{}\" branch",
        config.server_name, config.branch
    )
}

/// Render the run log as the HTML report body.
pub fn render_body(log: &RunLog) -> String {
    let mut body = String::from("<p>Deployment attempt log: </p>\n");

    if log.is_empty() {
        body.push_str("<p>No log data available</p>");
    } else {
        let joined = log
            .entries()
            .iter()
            .map(|entry| entry.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        body.push_str("<p>");
        body.push_str(&joined.replace('\n', "<br />\n"));
        body.push_str("</p>");
    }

    body
}

/// SMTP-backed notifier, transport built once at startup.
pub struct SmtpNotifier {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl SmtpNotifier {
    pub fn new(settings: &SmtpSettings) -> Self {
        Self {
            transport: build_transport(settings),
            from: settings.from.clone(),
        }
    }

    fn build_message(
        &self,
        recipient: &str,
        log: &RunLog,
        config: &DeployConfig,
    ) -> Result<Message, ReceiverError> {
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|e| ReceiverError::NotifyError(format!("bad sender address: {}", e)))?;
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| ReceiverError::NotifyError(format!("bad recipient address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject(config))
            .header(ContentType::TEXT_HTML)
            .body(render_body(log))
            .map_err(|e| ReceiverError::NotifyError(e.to_string()))
    }
}

fn build_transport(settings: &SmtpSettings) -> Option<AsyncSmtpTransport<Tokio1Executor>> {
    let host = settings.host.as_deref()?;

    let mut builder = match AsyncSmtpTransport::<Tokio1Executor>::relay(host) {
        Ok(builder) => builder,
        Err(e) => {
            warn!("SMTP relay [{}] rejected: {}", host, e);
            return None;
        }
    };
    builder = builder.port(settings.port);

    if let (Some(user), Some(pass)) = (&settings.user, &settings.pass) {
        builder = builder.credentials(Credentials::new(
            user.clone(),
            pass.expose_secret().to_string(),
        ));
    }

    Some(builder.build())
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, log: &RunLog, config: &DeployConfig) -> bool {
        let Some(transport) = &self.transport else {
            warn!("SMTP is not configured, dropping deployment report");
            return false;
        };
        if config.email.is_empty() {
            warn!("no report recipient configured, dropping deployment report");
            return false;
        }

        let message = match self.build_message(&config.email, log, config) {
            Ok(message) => message,
            Err(e) => {
                warn!("failed to build deployment report: {}", e);
                return false;
            }
        };

        match transport.send(message).await {
            Ok(_) => {
                debug!("deployment report sent to {}", config.email);
                true
            }
            Err(e) => {
                warn!("deployment report to {} failed: {}", config.email, e);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Settings, DEFAULT_DATE_FORMAT};

    fn config() -> DeployConfig {
        let mut settings = Settings::default();
        settings.server_name = "deploy-box".to_string();
        DeployConfig::new(&settings).unwrap()
    }

    #[test]
    fn test_subject_embeds_server_and_branch() {
        let subject = subject(&config());
        assert_eq!(
            subject,
            "MONITOR: Deployment to server \"deploy-box\" from \"master\" branch"
        );
    }

    #[test]
    fn test_empty_log_renders_placeholder() {
        let log = RunLog::new(chrono_tz::UTC, DEFAULT_DATE_FORMAT);
        let body = render_body(&log);
        assert!(body.contains("<p>No log data available</p>"));
    }

    #[test]
    fn test_entries_render_with_line_breaks() {
        let mut log = RunLog::new(chrono_tz::UTC, DEFAULT_DATE_FORMAT);
        log.append("step one");
        log.append("step two");

        let body = render_body(&log);
        assert!(body.starts_with("<p>Deployment attempt log: </p>"));
        assert!(body.contains(" --- INFO: step one<br />"));
        assert!(body.contains(" --- INFO: step two"));
    }

    #[test]
    fn test_message_builds_for_valid_recipient() {
        let notifier = SmtpNotifier::new(&SmtpSettings::default());
        let mut config = config();
        config.email = "ops@example.com".to_string();

        let log = RunLog::new(chrono_tz::UTC, DEFAULT_DATE_FORMAT);
        assert!(notifier.build_message(&config.email, &log, &config).is_ok());
        assert!(notifier
            .build_message("not an address", &log, &config)
            .is_err());
    }
}
