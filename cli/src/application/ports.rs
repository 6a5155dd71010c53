//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use crate::domain::{CommandResult, DeployConfig, RemoteTarget};

// ── Remote Session Ports ──────────────────────────────────────────────────────

/// Opens authenticated sessions. Called once per run.
#[allow(async_fn_in_trait)]
pub trait SessionConnector {
    /// The session type handed back on success.
    type Session: RemoteSession;

    /// Connect and authenticate to `target`.
    ///
    /// `timeout` bounds the TCP connect, the handshake and authentication;
    /// commands issued later on the session are not bounded by it.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, unreachable host, rejected credentials or
    /// a host key that fails the target's host-key policy.
    async fn connect(&self, target: &RemoteTarget, timeout: Duration) -> Result<Self::Session>;
}

/// One live connection to one host.
#[allow(async_fn_in_trait)]
pub trait RemoteSession {
    /// Run `command` through the remote shell and wait for end-of-output.
    ///
    /// A non-zero exit is not an error; it is reported in the result.
    async fn run_command(&self, command: &str) -> Result<CommandResult>;

    /// Copy `local` to `remote`, overwriting any existing file.
    async fn upload(&self, local: &Path, remote: &str) -> Result<()>;

    /// Release the file-transfer channel and the connection.
    ///
    /// Consumes the session, so it runs at most once.
    async fn close(self) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit a failure message.
    fn error(&self, message: &str);
    /// Show remote output verbatim.
    fn output(&self, text: &str);
}

// ── Configuration Ports ───────────────────────────────────────────────────────

/// Loads the deployment configuration.
pub trait ConfigStore {
    /// Load the configuration with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be parsed.
    fn load(&self) -> Result<DeployConfig>;

    /// Location the configuration is read from.
    ///
    /// # Errors
    ///
    /// Returns an error if the default location cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}

/// Asks the operator for a secret when none is configured.
pub trait SecretPrompt {
    /// Returns `None` when prompting is not possible (no TTY, `--yes`, CI).
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt itself fails.
    fn password(&self, prompt: &str) -> Result<Option<String>>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Local file access used by the deployment steps.
pub trait LocalFs {
    /// Whether `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Read a UTF-8 text file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}
