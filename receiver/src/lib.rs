//! Deployment Receiver Library
//!
//! Core modules for the pushdock webhook deployment receiver.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod logs;
pub mod models;
pub mod notify;
pub mod server;
pub mod settings;
pub mod telemetry;
pub mod utils;
