//! Outbound notifications

pub mod mailer;
