//! Deployment configuration schema, runtime target types and validators.
//!
//! Pure functions only: No I/O, no async, no filesystem access.

use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RESTART_COMMAND: &str = "pm2 restart all";
pub const DEFAULT_STATUS_COMMAND: &str = "pm2 status";

/// Environment variable names are the only keys we grep for on the remote
/// side, so they must never carry regex or shell metacharacters.
pub static KEY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex")
});

// ── Enumerations ─────────────────────────────────────────────────────────────

/// Which steps a deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Plan {
    /// Upload files, restart, query status.
    #[default]
    Transfer,
    /// Upload files, write and verify the environment file, restart, query status.
    Configure,
}

impl Plan {
    /// Whether the remote mutation step runs under this plan.
    #[must_use]
    pub fn writes_environment(self) -> bool {
        matches!(self, Self::Configure)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Configure => "configure",
        }
    }
}

/// What to do with a host key that is not in the known-hosts file yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Accept and remember unknown keys. Changed keys are still rejected.
    #[default]
    AcceptNew,
    /// Reject any key not already remembered.
    Strict,
}

impl HostKeyPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AcceptNew => "accept-new",
            Self::Strict => "strict",
        }
    }
}

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `hoist.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Where and as whom to deploy.
    pub target: TargetConfig,
    /// Upper bound for TCP connect, handshake and authentication.
    pub connect_timeout_secs: u64,
    /// Steps to run.
    pub plan: Plan,
    /// Files to upload, in order.
    pub transfer: Vec<TransferItem>,
    /// Environment file written by the `configure` plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentConfig>,
    /// Supervisor commands.
    pub restart: RestartConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            plan: Plan::default(),
            transfer: Vec::new(),
            environment: None,
            restart: RestartConfig::default(),
        }
    }
}

/// Host addressing and credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Password for non-interactive authentication. Prefer `HOIST_PASSWORD`.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Private key used instead of a password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<PathBuf>,
    #[serde(skip_serializing)]
    pub passphrase: Option<String>,
    /// Absolute directory every relative remote path is resolved against.
    pub remote_root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_hosts: Option<PathBuf>,
    pub host_key_policy: HostKeyPolicy,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            user: String::new(),
            password: None,
            identity_file: None,
            passphrase: None,
            remote_root: String::new(),
            known_hosts: None,
            host_key_policy: HostKeyPolicy::default(),
        }
    }
}

impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("identity_file", &self.identity_file)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("remote_root", &self.remote_root)
            .field("known_hosts", &self.known_hosts)
            .field("host_key_policy", &self.host_key_policy)
            .finish()
    }
}

impl TargetConfig {
    /// The credential the file (or environment) already provides, if any.
    ///
    /// A password wins over an identity file.
    #[must_use]
    pub fn configured_credential(&self) -> Option<Credential> {
        if let Some(password) = &self.password {
            return Some(Credential::Password(password.clone()));
        }
        self.identity_file
            .as_ref()
            .map(|path| Credential::IdentityFile {
                path: path.clone(),
                passphrase: self.passphrase.clone(),
            })
    }
}

/// One local file and where it lands on the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    pub local: PathBuf,
    pub remote: String,
}

/// The `KEY=VALUE` file written by the `configure` plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Local payload, e.g. `.env.production`.
    pub local: PathBuf,
    /// Remote destination, e.g. `.env`.
    pub remote: String,
    /// Keys that must be present after the write.
    #[serde(default)]
    pub required_keys: Vec<String>,
}

/// Process supervisor commands, run inside the remote root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    pub command: String,
    pub status: String,
    /// Substrings marking stderr lines that are informational, not failures.
    pub benign_stderr: Vec<String>,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_RESTART_COMMAND.to_string(),
            status: DEFAULT_STATUS_COMMAND.to_string(),
            benign_stderr: Vec::new(),
        }
    }
}

// ── Runtime target ───────────────────────────────────────────────────────────

/// How the session authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Password(String),
    IdentityFile {
        path: PathBuf,
        passphrase: Option<String>,
    },
    /// Ask a running ssh-agent.
    Agent,
}

impl Credential {
    /// Short label safe to print.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Password(_) => "password",
            Self::IdentityFile { .. } => "identity file",
            Self::Agent => "ssh-agent",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(<redacted>)"),
            Self::IdentityFile { path, .. } => f
                .debug_struct("IdentityFile")
                .field("path", path)
                .finish_non_exhaustive(),
            Self::Agent => f.write_str("Agent"),
        }
    }
}

/// Where and as whom a run deploys. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct RemoteTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub credential: Credential,
    pub remote_root: String,
    pub known_hosts: PathBuf,
    pub host_key_policy: HostKeyPolicy,
}

impl RemoteTarget {
    /// Build the run's target from a validated config.
    #[must_use]
    pub fn from_config(target: &TargetConfig, credential: Credential, known_hosts: PathBuf) -> Self {
        Self {
            host: target.host.clone(),
            port: target.port,
            user: target.user.clone(),
            credential,
            remote_root: target.remote_root.clone(),
            known_hosts,
            host_key_policy: target.host_key_policy,
        }
    }

    /// `user@host` or `user@host:port` for display.
    #[must_use]
    pub fn display_addr(&self) -> String {
        if self.port == DEFAULT_PORT {
            format!("{}@{}", self.user, self.host)
        } else {
            format!("{}@{}:{}", self.user, self.host, self.port)
        }
    }

    /// Resolve `path` against the remote root unless it is already absolute.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        resolve_remote_path(&self.remote_root, path)
    }
}

/// Join a relative remote path onto `root`; absolute paths pass through.
#[must_use]
pub fn resolve_remote_path(root: &str, path: &str) -> String {
    if path.starts_with('/') {
        return path.to_string();
    }
    let root = root.trim_end_matches('/');
    let path = path.trim_start_matches("./");
    format!("{root}/{path}")
}

impl DeployConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a required environment key name.
///
/// # Errors
///
/// Returns an error if the name is not a plain shell identifier.
pub fn validate_key_name(key: &str) -> Result<(), ConfigError> {
    if KEY_NAME_RE.is_match(key) {
        Ok(())
    } else {
        Err(ConfigError::InvalidKeyName(key.to_string()))
    }
}

/// Validates a whole configuration before anything touches the network.
///
/// # Errors
///
/// Returns the first problem found.
pub fn validate_config(config: &DeployConfig) -> Result<(), ConfigError> {
    let target = &config.target;
    if target.host.trim().is_empty() {
        return Err(ConfigError::Missing("target.host"));
    }
    if target.user.trim().is_empty() {
        return Err(ConfigError::Missing("target.user"));
    }
    if target.remote_root.is_empty() {
        return Err(ConfigError::Missing("target.remote_root"));
    }
    if !target.remote_root.starts_with('/') {
        return Err(ConfigError::InvalidValue {
            key: "target.remote_root",
            value: target.remote_root.clone(),
            hint: "The remote root must be an absolute path.",
        });
    }
    if target.port == 0 {
        return Err(ConfigError::InvalidValue {
            key: "target.port",
            value: "0".to_string(),
            hint: "Use a port between 1 and 65535.",
        });
    }
    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "connect_timeout_secs",
            value: "0".to_string(),
            hint: "The connect timeout must be at least one second.",
        });
    }
    for item in &config.transfer {
        if item.remote.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "transfer.remote",
                value: item.local.display().to_string(),
                hint: "Every transfer item needs a remote path.",
            });
        }
    }
    if config.plan.writes_environment() && config.environment.is_none() {
        return Err(ConfigError::MissingEnvironment);
    }
    if let Some(env) = &config.environment {
        if env.remote.trim().is_empty() {
            return Err(ConfigError::Missing("environment.remote"));
        }
        for key in &env.required_keys {
            validate_key_name(key)?;
        }
    }
    if config.restart.command.trim().is_empty() {
        return Err(ConfigError::Missing("restart.command"));
    }
    if config.restart.status.trim().is_empty() {
        return Err(ConfigError::Missing("restart.status"));
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
