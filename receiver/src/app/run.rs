//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::errors::ReceiverError;
use crate::notify::mailer::SmtpNotifier;
use crate::server::serve::serve;
use crate::server::state::{PostDeployHook, ServerState};

/// Run the deployment receiver until the shutdown signal resolves.
pub async fn run(
    options: AppOptions,
    post_deploy: Option<PostDeployHook>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ReceiverError> {
    info!("Initializing deployment receiver...");

    let config = Arc::new(options.deploy);
    let notifier = Arc::new(SmtpNotifier::new(&options.smtp));
    let state = Arc::new(ServerState::new(config, notifier, post_deploy));

    let handle = serve(&options.server, state, shutdown_signal).await?;
    handle
        .await
        .map_err(|e| ReceiverError::ServerError(e.to_string()))??;

    info!("Shutdown complete");
    Ok(())
}
