//! Remote command results and how the restart step judges them.

use serde::Serialize;

use crate::domain::error::RestartWarning;

/// Everything a remote command hands back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Set when the remote process was ended by a signal instead of exiting.
    /// `exit_code` is meaningless in that case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
}

impl CommandResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0 && self.signal.is_none()
    }

    /// `exited with status N` or `killed by signal SIG`.
    #[must_use]
    pub fn termination(&self) -> String {
        match &self.signal {
            Some(signal) => format!("killed by signal {signal}"),
            None => format!("exited with status {}", self.exit_code),
        }
    }

    /// stderr lines that are neither blank nor matched by a benign substring.
    #[must_use]
    pub fn significant_stderr(&self, benign: &[String]) -> Vec<&str> {
        self.stderr
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .filter(|line| !benign.iter().any(|b| !b.is_empty() && line.contains(b.as_str())))
            .collect()
    }
}

/// What a supervisor command left behind for the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    /// stdout exactly as the command printed it. `None` when it was blank or
    /// the command never ran.
    pub output: Option<String>,
    pub warning: Option<RestartWarning>,
}

/// Decide whether a supervisor command deserves a warning.
///
/// A non-zero exit or a fatal signal always warns. Otherwise stderr warns unless every line is
/// blank or contains one of the `benign` substrings.
#[must_use]
pub fn classify(command: &str, result: &CommandResult, benign: &[String]) -> Option<RestartWarning> {
    let noisy = result.significant_stderr(benign);
    if !result.success() {
        let reason = match noisy.first() {
            Some(line) => format!("{}: {line}", result.termination()),
            None => result.termination(),
        };
        return Some(RestartWarning {
            command: command.to_string(),
            reason,
        });
    }
    if noisy.is_empty() {
        return None;
    }
    Some(RestartWarning {
        command: command.to_string(),
        reason: format!("wrote to stderr: {}", noisy.join(" | ")),
    })
}
