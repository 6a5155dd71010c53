//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Deployment errors ─────────────────────────────────────────────────────────

/// Fatal deployment failures. Any of these moves the run to `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    #[error("cannot connect to {host}: {reason}")]
    Connection { host: String, reason: String },

    #[error("cannot upload {local} to {remote}: {reason}")]
    Transfer {
        local: String,
        remote: String,
        reason: String,
    },

    #[error("cannot write {path}: {reason}")]
    Mutation { path: String, reason: String },

    #[error("required keys missing from {path}: {}", missing.join(", "))]
    Verification { path: String, missing: Vec<String> },
}

impl DeployError {
    /// Stable machine-readable code used by `--json` output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection_error",
            Self::Transfer { .. } => "transfer_error",
            Self::Mutation { .. } => "mutation_error",
            Self::Verification { .. } => "verification_error",
        }
    }
}

/// A restart or status command that did not come back clean.
///
/// Never fatal: the run records it and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{command}' {reason}")]
pub struct RestartWarning {
    pub command: String,
    pub reason: String,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating a deployment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: &'static str,
        value: String,
        hint: &'static str,
    },

    #[error("Invalid key name '{0}': must match ^[A-Za-z_][A-Za-z0-9_]*$")]
    InvalidKeyName(String),

    #[error("plan 'configure' needs an 'environment' section")]
    MissingEnvironment,
}
