//! Server state

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::deploy::DeployConfig;
use crate::notify::mailer::Notifier;

/// Post-deploy callback, invoked synchronously with the final step's output.
pub type PostDeployHook = Arc<dyn Fn(&str) -> anyhow::Result<()> + Send + Sync>;

/// Server state shared across handlers
pub struct ServerState {
    pub config: Arc<DeployConfig>,
    pub notifier: Arc<dyn Notifier>,
    pub post_deploy: Option<PostDeployHook>,

    /// Serializes synchronization runs against the working directory.
    pub deploy_lock: Mutex<()>,
}

impl ServerState {
    pub fn new(
        config: Arc<DeployConfig>,
        notifier: Arc<dyn Notifier>,
        post_deploy: Option<PostDeployHook>,
    ) -> Self {
        Self {
            config,
            notifier,
            post_deploy,
            deploy_lock: Mutex::new(()),
        }
    }
}
