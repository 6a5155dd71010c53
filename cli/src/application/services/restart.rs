//! Application service: supervisor restart and status query.
//!
//! Failures here are warnings, never errors: a restart may need time to
//! converge, so its immediate result is not trusted to fail the run.

use crate::application::ports::{ProgressReporter, RemoteSession};
use crate::domain::command::{self, SupervisorReport};
use crate::domain::config::{RemoteTarget, RestartConfig};
use crate::domain::error::RestartWarning;
use crate::domain::shell;

/// Ask the supervisor to restart, from inside the remote root.
pub async fn restart(
    session: &impl RemoteSession,
    reporter: &impl ProgressReporter,
    target: &RemoteTarget,
    restart: &RestartConfig,
) -> SupervisorReport {
    reporter.step(&format!("restarting: {}...", restart.command));
    let report = run_supervisor(
        session,
        reporter,
        target,
        &restart.command,
        &restart.benign_stderr,
    )
    .await;
    match &report.warning {
        Some(w) => reporter.warn(&format!("restart may have failed: {w}")),
        None => reporter.success("restart issued"),
    }
    report
}

/// Query the supervisor status and show it verbatim.
pub async fn status(
    session: &impl RemoteSession,
    reporter: &impl ProgressReporter,
    target: &RemoteTarget,
    restart: &RestartConfig,
) -> SupervisorReport {
    reporter.step(&format!("querying status: {}...", restart.status));
    let report = run_supervisor(
        session,
        reporter,
        target,
        &restart.status,
        &restart.benign_stderr,
    )
    .await;
    if let Some(w) = &report.warning {
        reporter.warn(&format!("status query: {w}"));
    }
    report
}

async fn run_supervisor(
    session: &impl RemoteSession,
    reporter: &impl ProgressReporter,
    target: &RemoteTarget,
    command: &str,
    benign: &[String],
) -> SupervisorReport {
    let line = shell::in_dir(&target.remote_root, command);
    match session.run_command(&line).await {
        Ok(result) => {
            tracing::debug!(
                command,
                exit_code = result.exit_code,
                signal = result.signal.as_deref(),
                "supervisor command finished"
            );
            let warning = command::classify(command, &result, benign);
            let output = (!result.stdout.trim().is_empty()).then_some(result.stdout);
            if let Some(text) = &output {
                reporter.output(text);
            }
            SupervisorReport { output, warning }
        }
        Err(e) => {
            tracing::warn!(command, error = %e, "supervisor command did not run");
            SupervisorReport {
                output: None,
                warning: Some(RestartWarning {
                    command: command.to_string(),
                    reason: format!("did not run: {e:#}"),
                }),
            }
        }
    }
}
