//! Application service: the deployment orchestrator.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! One session per run. Steps run strictly in order:
//! connect → transfer → (write + verify) → restart → status → close.
//! Connect, transfer and write/verify failures are fatal; restart and status
//! problems are recorded as warnings. The session is closed on every path
//! that opened it.

use std::time::Duration;

use chrono::Utc;

use crate::application::ports::{LocalFs, ProgressReporter, RemoteSession, SessionConnector};
use crate::application::services::{mutation, restart, transfer};
use crate::domain::config::{EnvironmentConfig, Plan, RemoteTarget, RestartConfig, TransferItem};
use crate::domain::error::DeployError;
use crate::domain::run::{RunState, RunSummary, StepKind};

/// Everything one run needs, borrowed from the loaded configuration.
pub struct DeployRequest<'a> {
    pub target: &'a RemoteTarget,
    pub plan: Plan,
    pub transfer: &'a [TransferItem],
    pub environment: Option<&'a EnvironmentConfig>,
    pub restart: &'a RestartConfig,
    pub connect_timeout: Duration,
}

/// Run one deployment and return its summary.
///
/// Never returns an error: fatal failures are recorded in the summary with
/// state `Failed`, which callers turn into a non-zero exit.
pub async fn deploy(
    connector: &impl SessionConnector,
    local_fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
    request: &DeployRequest<'_>,
) -> RunSummary {
    let target = request.target;
    let mut summary = RunSummary::new(target.host.clone(), request.plan, Utc::now());
    tracing::info!(host = %target.host, plan = request.plan.as_str(), "deployment starting");

    reporter.step(&format!("connecting to {}...", target.display_addr()));
    let session = match connector.connect(target, request.connect_timeout).await {
        Ok(session) => session,
        Err(e) => {
            let err = DeployError::Connection {
                host: target.host.clone(),
                reason: format!("{e:#}"),
            };
            tracing::error!(error = %err, "connect failed");
            reporter.error(&err.to_string());
            summary.fail(StepKind::Connect, &err);
            summary.finish(Utc::now());
            return summary;
        }
    };
    summary.advance(RunState::Connected);
    summary.ok(
        StepKind::Connect,
        format!("{} via {}", target.display_addr(), target.credential.kind()),
    );
    reporter.success(&format!("connected to {}", target.display_addr()));

    let outcome = run_steps(&session, local_fs, reporter, request, &mut summary).await;
    if let Err((step, err)) = outcome {
        tracing::error!(step = step.label(), error = %err, "deployment failed");
        reporter.error(&err.to_string());
        summary.fail(step, &err);
    }

    match session.close().await {
        Ok(()) => tracing::debug!("session closed"),
        Err(e) => {
            tracing::warn!(error = %e, "closing session failed");
            reporter.warn(&format!("closing session: {e:#}"));
            summary.warn(StepKind::Close, format!("{e:#}"));
        }
    }

    summary.finish(Utc::now());
    tracing::info!(state = ?summary.state, "deployment finished");
    summary
}

/// Steps between connect and close. The first fatal error stops the run.
async fn run_steps(
    session: &impl RemoteSession,
    local_fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
    request: &DeployRequest<'_>,
    summary: &mut RunSummary,
) -> Result<(), (StepKind, DeployError)> {
    let target = request.target;

    let uploaded = transfer::upload_all(session, local_fs, reporter, target, request.transfer)
        .await
        .map_err(|e| (StepKind::Transfer, e))?;
    summary.ok(StepKind::Transfer, format!("{uploaded} file(s) uploaded"));
    summary.advance(RunState::Transferred);

    if request.plan.writes_environment() {
        let env = request.environment.ok_or_else(|| {
            (
                StepKind::Mutate,
                DeployError::Mutation {
                    path: "environment".to_string(),
                    reason: "plan 'configure' has no environment section".to_string(),
                },
            )
        })?;
        let written = mutation::write_environment(session, local_fs, reporter, target, env)
            .await
            .map_err(|e| (StepKind::Mutate, e))?;
        summary.ok(
            StepKind::Mutate,
            format!(
                "{} ({} bytes, sha256 {})",
                written.path,
                written.bytes,
                short_digest(&written.sha256)
            ),
        );

        let found = mutation::verify_keys(session, reporter, &written.path, &env.required_keys)
            .await
            .map_err(|e| (StepKind::Verify, e))?;
        summary.ok(StepKind::Verify, format!("{} key(s) present", found.len()));
        summary.advance(RunState::Mutated);
    }

    let restarted = restart::restart(session, reporter, target, request.restart).await;
    summary.supervisor(StepKind::Restart, &request.restart.command, restarted);
    summary.advance(RunState::Restarted);

    let status = restart::status(session, reporter, target, request.restart).await;
    summary.supervisor(StepKind::Status, &request.restart.status, status);
    summary.advance(RunState::Done);
    Ok(())
}

fn short_digest(hex: &str) -> &str {
    hex.get(..12).unwrap_or(hex)
}
