//! Application service: supervisor status without deploying anything.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{ProgressReporter, RemoteSession, SessionConnector};
use crate::application::services::restart;
use crate::domain::command::SupervisorReport;
use crate::domain::config::{RemoteTarget, RestartConfig};
use crate::domain::error::DeployError;

/// Connect, run the status command, close.
///
/// Returns the status text and the warning the command produced, if any.
///
/// # Errors
///
/// Returns `DeployError::Connection` if the session cannot be opened.
pub async fn query_status(
    connector: &impl SessionConnector,
    reporter: &impl ProgressReporter,
    target: &RemoteTarget,
    restart_cfg: &RestartConfig,
    timeout: Duration,
) -> Result<SupervisorReport> {
    let session = connector
        .connect(target, timeout)
        .await
        .map_err(|e| DeployError::Connection {
            host: target.host.clone(),
            reason: format!("{e:#}"),
        })?;

    let report = restart::status(&session, reporter, target, restart_cfg).await;

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "closing session failed");
        reporter.warn(&format!("closing session: {e:#}"));
    }
    Ok(report)
}
