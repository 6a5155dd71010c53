//! Run state machine and the summary a deployment leaves behind.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::command::SupervisorReport;
use crate::domain::config::Plan;
use crate::domain::error::DeployError;

/// Where a deployment run stands.
///
/// `Init → Connected → Transferred → Mutated? → Restarted → Done`, with
/// `Failed` reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Init,
    Connected,
    Transferred,
    Mutated,
    Restarted,
    Done,
    Failed,
}

impl RunState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether the machine may move from `self` to `next`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (from, Self::Failed) => !from.is_terminal(),
            (Self::Init, Self::Connected)
            | (Self::Connected, Self::Transferred)
            | (Self::Transferred, Self::Mutated)
            | (Self::Transferred | Self::Mutated, Self::Restarted)
            | (Self::Restarted, Self::Done) => true,
            _ => false,
        }
    }
}

/// The unit of work a summary line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Connect,
    Transfer,
    Mutate,
    Verify,
    Restart,
    Status,
    Close,
}

impl StepKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Transfer => "transfer",
            Self::Mutate => "write",
            Self::Verify => "verify",
            Self::Restart => "restart",
            Self::Status => "status",
            Self::Close => "close",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    Warning,
    Failed,
}

/// One line of the run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: StepKind,
    pub outcome: Outcome,
    pub detail: String,
    /// Verbatim stdout of the restart and status commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// The fatal error that ended a run, flattened for display and JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub code: &'static str,
    pub message: String,
}

/// Ordered log of step outcomes plus the final state of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub host: String,
    pub plan: Plan,
    pub state: RunState,
    pub steps: Vec<StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    #[must_use]
    pub fn new(host: impl Into<String>, plan: Plan, started_at: DateTime<Utc>) -> Self {
        Self {
            host: host.into(),
            plan,
            state: RunState::Init,
            steps: Vec::new(),
            failure: None,
            started_at,
            finished_at: None,
        }
    }

    /// Move to `next`. Illegal transitions are a programming error.
    pub fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {next:?}",
            self.state
        );
        self.state = next;
    }

    pub fn ok(&mut self, step: StepKind, detail: impl Into<String>) {
        self.push(step, Outcome::Ok, detail.into());
    }

    pub fn warn(&mut self, step: StepKind, detail: impl Into<String>) {
        self.push(step, Outcome::Warning, detail.into());
    }

    /// Record a restart or status step. A warning never changes the state.
    pub fn supervisor(&mut self, step: StepKind, command: &str, report: SupervisorReport) {
        let (outcome, detail) = match report.warning {
            Some(warning) => (Outcome::Warning, warning.to_string()),
            None => (Outcome::Ok, command.to_string()),
        };
        self.steps.push(StepRecord {
            step,
            outcome,
            detail,
            output: report.output,
        });
    }

    /// Record a fatal error against `step` and move to `Failed`.
    pub fn fail(&mut self, step: StepKind, err: &DeployError) {
        self.push(step, Outcome::Failed, err.to_string());
        self.failure = Some(Failure {
            code: err.code(),
            message: err.to_string(),
        });
        self.advance(RunState::Failed);
    }

    pub fn finish(&mut self, at: DateTime<Utc>) {
        self.finished_at = Some(at);
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == RunState::Done
    }

    /// Whether any record mentions `step`.
    #[must_use]
    pub fn attempted(&self, step: StepKind) -> bool {
        self.steps.iter().any(|r| r.step == step)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|r| r.outcome == Outcome::Warning)
    }

    fn push(&mut self, step: StepKind, outcome: Outcome, detail: String) {
        self.steps.push(StepRecord {
            step,
            outcome,
            detail,
            output: None,
        });
    }
}
