//! Application service: write the remote environment file and verify it.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use sha2::{Digest, Sha256};

use crate::application::ports::{LocalFs, ProgressReporter, RemoteSession};
use crate::domain::config::{EnvironmentConfig, RemoteTarget};
use crate::domain::error::DeployError;
use crate::domain::{shell, verify};

/// What `write_environment` put on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Absolute remote path.
    pub path: String,
    /// Hex SHA-256 of the normalized payload.
    pub sha256: String,
    pub bytes: usize,
}

/// Replace the remote environment file with the local payload.
///
/// # Errors
///
/// Returns `DeployError::Mutation` if the payload cannot be read or the
/// remote write does not exit cleanly.
pub async fn write_environment(
    session: &impl RemoteSession,
    local_fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
    target: &RemoteTarget,
    env: &EnvironmentConfig,
) -> Result<WrittenFile, DeployError> {
    let path = target.resolve(&env.remote);
    reporter.step(&format!("writing {path}..."));

    let raw = local_fs
        .read_to_string(&env.local)
        .map_err(|e| DeployError::Mutation {
            path: path.clone(),
            reason: format!("cannot read {}: {e:#}", env.local.display()),
        })?;
    let payload = shell::normalize_payload(&raw);
    let sha256 = format!("{:x}", Sha256::digest(payload.as_bytes()));

    let script = shell::write_file_script(&path, &payload);
    let result = session
        .run_command(&script)
        .await
        .map_err(|e| DeployError::Mutation {
            path: path.clone(),
            reason: format!("{e:#}"),
        })?;
    if !result.success() {
        let stderr = result.stderr.trim();
        let reason = if stderr.is_empty() {
            format!("write {}", result.termination())
        } else {
            stderr.to_string()
        };
        return Err(DeployError::Mutation { path, reason });
    }

    tracing::info!(%path, bytes = payload.len(), %sha256, "environment written");
    reporter.success(&format!("wrote {path} ({} bytes)", payload.len()));
    Ok(WrittenFile {
        path,
        sha256,
        bytes: payload.len(),
    })
}

/// Check that every required key is defined in the remote file at `path`.
///
/// Only key names travel back; values stay on the remote side. Returns the
/// keys that were found, in the order they were required.
///
/// # Errors
///
/// Returns `DeployError::Verification` naming every missing key, or
/// `DeployError::Mutation` if the query itself could not run.
pub async fn verify_keys(
    session: &impl RemoteSession,
    reporter: &impl ProgressReporter,
    path: &str,
    required: &[String],
) -> Result<Vec<String>, DeployError> {
    if required.is_empty() {
        reporter.success("no required keys configured");
        return Ok(Vec::new());
    }
    reporter.step(&format!("verifying {} key(s) in {path}...", required.len()));

    let query = shell::grep_keys_command(path, required);
    let result = session
        .run_command(&query)
        .await
        .map_err(|e| DeployError::Mutation {
            path: path.to_string(),
            reason: format!("verification query failed: {e:#}"),
        })?;
    // grep exits 1 on "no match", which verification reports below; anything
    // above that is grep itself failing.
    if result.exit_code > 1 || result.signal.is_some() {
        let stderr = result.stderr.trim();
        let detail = if stderr.is_empty() {
            result.termination()
        } else {
            stderr.to_string()
        };
        return Err(DeployError::Mutation {
            path: path.to_string(),
            reason: format!("verification query failed: {detail}"),
        });
    }

    let missing = verify::missing_keys(&result.stdout, required);
    if !missing.is_empty() {
        return Err(DeployError::Verification {
            path: path.to_string(),
            missing,
        });
    }

    reporter.success(&format!("keys present: {}", required.join(", ")));
    Ok(required.to_vec())
}
