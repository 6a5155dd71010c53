//! Application service: upload the configured artifacts.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::{LocalFs, ProgressReporter, RemoteSession};
use crate::domain::config::{RemoteTarget, TransferItem};
use crate::domain::error::DeployError;

/// Upload `items` in order, stopping at the first failure.
///
/// A partially deployed artifact set is not safe to restart, so later items
/// are never attempted once one fails. Each success is reported before the
/// next item starts. Returns the number of files uploaded.
///
/// # Errors
///
/// Returns `DeployError::Transfer` naming the first item that failed.
pub async fn upload_all(
    session: &impl RemoteSession,
    local_fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
    target: &RemoteTarget,
    items: &[TransferItem],
) -> Result<usize, DeployError> {
    let total = items.len();
    for (index, item) in items.iter().enumerate() {
        let local = item.local.display().to_string();
        let remote = target.resolve(&item.remote);
        reporter.step(&format!("uploading {local} ({}/{total})...", index + 1));

        if !local_fs.is_file(&item.local) {
            return Err(DeployError::Transfer {
                local,
                remote,
                reason: "local file not found".to_string(),
            });
        }

        if let Err(e) = session.upload(&item.local, &remote).await {
            tracing::warn!(%local, %remote, error = %e, "upload failed");
            return Err(DeployError::Transfer {
                local,
                remote,
                reason: format!("{e:#}"),
            });
        }

        tracing::info!(%local, %remote, "uploaded");
        reporter.success(&format!("uploaded {local} → {remote}"));
    }
    Ok(total)
}
