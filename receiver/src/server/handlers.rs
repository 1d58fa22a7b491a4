//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::deploy::report::{RunLog, Severity};
use crate::deploy::runner;
use crate::models::push::PushNotification;
use crate::server::state::ServerState;
use crate::telemetry::collect_metrics;
use crate::utils::version_info;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "pushdock".to_string(),
        version: version.version,
    })
}

/// Version response
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Metrics handler
pub async fn metrics_handler() -> impl IntoResponse {
    Json(collect_metrics())
}

/// Webhook handler: classify the push, maybe run the synchronization
/// sequence, and always hand the run log to the notifier. The report goes
/// out from a detached task so slow delivery never holds the response open.
pub async fn webhook_handler(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> impl IntoResponse {
    let (status, ack, log) = process_push(&state, &body).await;

    let notifier = state.notifier.clone();
    let config = state.config.clone();
    tokio::spawn(async move {
        notifier.send(&log, &config).await;
    });

    (status, ack)
}

async fn process_push(state: &ServerState, body: &[u8]) -> (StatusCode, &'static str, RunLog) {
    let config = state.config.as_ref();
    let mut log = RunLog::new(config.timezone, config.date_format.clone());

    log.append(format!(
        "Attempting deployment to server \"{}\" from \"{}\" branch...",
        config.server_name, config.branch
    ));

    if body.is_empty() {
        info!("empty webhook body, treating as a browser probe");
        log.append("No commit data in request, possible probe from a browser.");
        return (StatusCode::OK, "No commit data. Exit.", log);
    }

    let push: PushNotification = match serde_json::from_slice(body) {
        Ok(push) => push,
        Err(e) => {
            error!("webhook body does not decode as a push notification: {}", e);
            log.append_with_level(
                format!("Discarding request body that does not decode as a push notification: {}", e),
                Severity::Error,
            );
            return (StatusCode::BAD_REQUEST, "Malformed push payload.", log);
        }
    };

    let commits = push.commits_for_branch(&config.branch, config.timezone, &config.date_format);

    log.append(format!(
        "Receiving commit from [{}] to repository [{}]... ",
        push.actor_label(),
        push.repository.full_name
    ));

    if commits.is_empty() {
        log.append(format!("No commits caught for [{}].", config.branch));
        return (StatusCode::OK, "OK", log);
    }

    for commit in &commits {
        log.append(format!(
            "Caught commit by [{}] at [{}] with message [{}]",
            commit.author, commit.date, commit.message
        ));
    }

    let last_output = {
        let _guard = state.deploy_lock.lock().await;
        runner::run(config, &mut log).await
    };

    match state
        .post_deploy
        .as_ref()
        .map(|hook| hook(&last_output))
        .transpose()
    {
        Ok(_) => log.append("Deployment successful."),
        Err(e) => log.append_with_level(
            format!("Post-deploy hook failed: {:#}", e),
            Severity::Error,
        ),
    }

    (StatusCode::OK, "OK", log)
}
