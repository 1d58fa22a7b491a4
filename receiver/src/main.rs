//! Deployment Receiver - Entry Point
//!
//! A small webhook-triggered deployment receiver: accepts push notifications
//! from a source-code hosting service, synchronizes a local git checkout when
//! the tracked branch moves, and emails a report of every attempt.

use std::collections::HashMap;
use std::env;

use pushdock::app::options::{AppOptions, ServerOptions};
use pushdock::app::run::run;
use pushdock::deploy::DeployConfig;
use pushdock::logs::{init_logging, LogOptions};
use pushdock::settings::Settings;
use pushdock::utils::version_info;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        println!("{}", serde_json::to_string_pretty(&version).unwrap());
        return;
    }

    // Retrieve the settings file
    let settings_path = cli_args
        .get("config")
        .map(String::as_str)
        .unwrap_or("deploy_conf.json");
    let settings = match Settings::load(settings_path).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file {}: {}", settings_path, e);
            return;
        }
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            println!("Failed to initialize logging: {e}");
            None
        }
    };

    // Validate the deployment configuration
    let deploy = match DeployConfig::new(&settings) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid deployment configuration: {}", e);
            return;
        }
    };

    // Run the server
    let options = AppOptions {
        deploy,
        server: ServerOptions {
            host: settings.server.host.clone(),
            port: settings.server.port,
        },
        smtp: settings.smtp.clone(),
    };

    info!("Running deployment receiver with options: {:?}", options);
    let result = run(options, None, await_shutdown_signal()).await;
    if let Err(e) = result {
        error!("Failed to run the receiver: {e}");
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("Ctrl+C received, shutting down...");
    }
}
