//! Per-invocation run log, flushed as the emailed deployment report.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Severity of a run log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Debug,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// One timestamped run log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Timestamp, already rendered in the display timezone and format
    pub stamp: String,

    /// Entry severity
    pub level: Severity,

    /// Entry message
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --- {}: {}", self.stamp, self.level, self.message)
    }
}

/// Ordered, append-only record of one deployment attempt. Owned by a single
/// invocation and discarded once the report is sent.
#[derive(Debug, Clone)]
pub struct RunLog {
    timezone: Tz,
    date_format: String,
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new(timezone: Tz, date_format: impl Into<String>) -> Self {
        Self {
            timezone,
            date_format: date_format.into(),
            entries: Vec::new(),
        }
    }

    /// Append a message at INFO severity.
    pub fn append(&mut self, message: impl Into<String>) {
        self.append_with_level(message, Severity::Info);
    }

    /// Append a message at the given severity, stamped with the current time
    /// in the display timezone.
    pub fn append_with_level(&mut self, message: impl Into<String>, level: Severity) {
        let stamp = Utc::now()
            .with_timezone(&self.timezone)
            .format(&self.date_format)
            .to_string();
        self.entries.push(LogEntry {
            stamp,
            level,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render an RFC 3339 timestamp in the display timezone with the given
/// format. Returns `None` when the input does not parse.
pub fn format_in_zone(raw: &str, timezone: Tz, date_format: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&timezone).format(date_format).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_DATE_FORMAT;

    #[test]
    fn test_entry_line_format() {
        let mut log = RunLog::new(chrono_tz::UTC, "%Y-%m-%d");
        log.append_with_level("boom", Severity::Error);

        let line = log.entries()[0].to_string();
        assert!(line.contains(" --- ERROR: boom"), "unexpected line: {line}");
    }

    #[test]
    fn test_append_preserves_order() {
        let mut log = RunLog::new(chrono_tz::Europe::Minsk, DEFAULT_DATE_FORMAT);
        log.append("first");
        log.append("second");
        log.append("third");

        let messages: Vec<&str> = log.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_format_in_zone_converts_to_display_timezone() {
        let formatted = format_in_zone(
            "2024-05-01T10:00:00+00:00",
            chrono_tz::Europe::Minsk,
            DEFAULT_DATE_FORMAT,
        )
        .unwrap();
        assert_eq!(formatted, "2024-05-01 13:00:00+03:00");
    }

    #[test]
    fn test_format_in_zone_is_deterministic() {
        let first = format_in_zone("2023-11-12T08:09:10Z", chrono_tz::Europe::Minsk, "%H:%M");
        let second = format_in_zone("2023-11-12T08:09:10Z", chrono_tz::Europe::Minsk, "%H:%M");
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("11:09"));
    }

    #[test]
    fn test_format_in_zone_rejects_garbage() {
        assert!(format_in_zone("yesterday-ish", chrono_tz::UTC, "%Y").is_none());
    }
}
