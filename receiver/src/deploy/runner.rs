//! Fixed git synchronization sequence against the configured checkout.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::deploy::report::RunLog;
use crate::deploy::DeployConfig;

/// One external command in the synchronization sequence.
#[derive(Debug, Clone)]
pub struct Step {
    /// Description entry written to the run log ahead of the output
    pub label: &'static str,

    /// Program to spawn
    pub program: String,

    /// Fixed argument vector, never shell-interpolated
    pub args: Vec<String>,
}

impl Step {
    fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Outcome of a single step, folded into the run log as it completes.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Command line the result belongs to
    pub command: String,

    /// Merged stderr and stdout of the process
    pub output: String,

    /// Whether the process exited with status zero
    pub success: bool,
}

/// The fixed synchronization sequence: confirm the working directory, check
/// its status, discard local modifications, fetch, pull.
pub fn sync_sequence(config: &DeployConfig) -> Vec<Step> {
    vec![
        Step {
            label: "Changing working directory... ",
            program: "pwd".to_string(),
            args: vec![],
        },
        Step {
            label: "Checking changes... ",
            program: "git".to_string(),
            args: vec!["status".to_string()],
        },
        Step {
            label: "Resetting repository... ",
            program: "git".to_string(),
            args: vec!["checkout".to_string(), "-f".to_string()],
        },
        Step {
            label: "Fetching code from repository... ",
            program: "git".to_string(),
            args: vec!["fetch".to_string(), config.remote.clone()],
        },
        Step {
            label: "Pulling in changes... ",
            program: "git".to_string(),
            args: vec![
                "pull".to_string(),
                config.remote.clone(),
                config.branch.clone(),
            ],
        },
    ]
}

/// Run the synchronization sequence, appending a description entry and an
/// output entry per step. A failing step never halts the sequence. Returns
/// the final step's output for the post-deploy hook.
pub async fn run(config: &DeployConfig, log: &mut RunLog) -> String {
    let mut last_output = String::new();

    for step in sync_sequence(config) {
        let result = run_step(&step, &config.directory, config.step_timeout).await;
        debug!(command = %result.command, success = result.success, "sync step finished");

        log.append(step.label);
        log.append(result.output.clone());
        last_output = result.output;
    }

    last_output
}

/// Execute one step with the working directory pinned to `dir`, capturing
/// stderr and stdout merged into one blob. A non-zero exit is captured, never
/// raised; a process that cannot be spawned yields empty output; a command
/// still running after `timeout` is killed and reported as failed.
pub async fn run_step(step: &Step, dir: &Path, timeout: Duration) -> StepResult {
    let command = step.command_line();

    let mut cmd = Command::new(&step.program);
    cmd.args(&step.args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => {
            let merged = format!(
                "{}\n{}\n",
                String::from_utf8_lossy(&output.stderr),
                String::from_utf8_lossy(&output.stdout)
            );
            StepResult {
                command,
                output: merged,
                success: output.status.success(),
            }
        }
        Ok(Err(e)) => {
            warn!("could not spawn [{}]: {}", command, e);
            StepResult {
                command,
                output: String::new(),
                success: false,
            }
        }
        Err(_) => {
            warn!("[{}] timed out after {:?}", command, timeout);
            StepResult {
                command,
                output: format!("command timed out after {} seconds", timeout.as_secs()),
                success: false,
            }
        }
    }
}
