//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed object on
//! stdout. Failures use the error object from `format_error`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::command::SupervisorReport;
use crate::domain::config::DeployConfig;
use crate::domain::run::RunSummary;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Format a run summary, adding a top-level `success` flag.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_summary(summary: &RunSummary) -> Result<String> {
    let mut value = serde_json::to_value(summary).context("JSON serialization failed")?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("success".to_string(), summary.succeeded().into());
    }
    serde_json::to_string_pretty(&value).context("JSON serialization failed")
}

/// Format the result of `hoist status`, carrying the supervisor's own
/// output verbatim under `output`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_status(host: &str, report: &SupervisorReport) -> Result<String> {
    let obj = serde_json::json!({
        "host": host,
        "ok": report.warning.is_none(),
        "warning": report.warning.as_ref().map(ToString::to_string),
        "output": report.output,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Renders domain types as JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn render_version(version: &str) -> Result<()> {
        let obj = serde_json::json!({ "version": version });
        println!(
            "{}",
            serde_json::to_string_pretty(&obj).context("JSON serialization failed")?
        );
        Ok(())
    }

    pub fn render_summary(summary: &RunSummary) -> Result<()> {
        println!("{}", format_summary(summary)?);
        Ok(())
    }

    pub fn render_status(host: &str, report: &SupervisorReport) -> Result<()> {
        println!("{}", format_status(host, report)?);
        Ok(())
    }

    /// Passwords and passphrases are `skip_serializing` on the schema.
    pub fn render_config(config: &DeployConfig, path: &Path) -> Result<()> {
        let obj = serde_json::json!({
            "path": path.display().to_string(),
            "config": config,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&obj).context("JSON serialization failed")?
        );
        Ok(())
    }

    pub fn render_config_check(path: &Path, problems: &[String]) -> Result<()> {
        let obj = serde_json::json!({
            "path": path.display().to_string(),
            "valid": problems.is_empty(),
            "problems": problems,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&obj).context("JSON serialization failed")?
        );
        Ok(())
    }
}
