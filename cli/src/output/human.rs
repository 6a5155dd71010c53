//! Human-readable terminal renderer.

use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize as _;

use crate::domain::command::SupervisorReport;
use crate::domain::config::DeployConfig;
use crate::domain::run::{RunState, RunSummary};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) -> Result<()> {
        if !self.ctx.quiet {
            println!("hoist {version}");
        }
        Ok(())
    }

    /// Render the per-step log and final result of a deployment.
    pub fn render_summary(&self, summary: &RunSummary) -> Result<()> {
        if !self.ctx.quiet {
            println!();
            self.ctx.header(&format!(
                "Deployment to {} ({})",
                summary.host,
                summary.plan.as_str()
            ));
            for record in &summary.steps {
                let (mark, style) = self.ctx.styles.outcome(record.outcome);
                println!(
                    "  {} {:<9} {}",
                    mark.style(style),
                    record.step.label(),
                    record.detail
                );
            }
            println!();
        }

        match summary.state {
            RunState::Done => {
                let elapsed = summary
                    .finished_at
                    .map(|end| format_elapsed((end - summary.started_at).num_milliseconds()))
                    .unwrap_or_default();
                let warnings = summary.warnings().count();
                if warnings == 0 {
                    self.ctx
                        .success(&format!("Deployed to {}{elapsed}", summary.host));
                } else {
                    self.ctx.warn(&format!(
                        "Deployed to {}{elapsed} with {}",
                        summary.host,
                        plural(warnings, "warning")
                    ));
                }
            }
            _ => {
                let message = summary
                    .failure
                    .as_ref()
                    .map_or("deployment did not finish", |f| f.message.as_str());
                self.ctx.error(message);
            }
        }
        Ok(())
    }

    /// Render the status query result. The status text itself was already
    /// streamed by the reporter.
    pub fn render_status(&self, host: &str, report: &SupervisorReport) -> Result<()> {
        match &report.warning {
            None => self.ctx.success(&format!("status of {host} retrieved")),
            Some(w) => self.ctx.warn(&format!("status of {host}: {w}")),
        }
        Ok(())
    }

    /// Render the loaded configuration. Secrets show only whether they are set.
    pub fn render_config(&self, config: &DeployConfig, path: &Path) -> Result<()> {
        if self.ctx.quiet {
            return Ok(());
        }
        let target = &config.target;
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.title)
        );
        println!();
        self.ctx.kv("target.host:", &target.host);
        self.ctx.kv("target.port:", &target.port.to_string());
        self.ctx.kv("target.user:", &target.user);
        self.ctx.kv("target.auth:", &auth_display(config));
        self.ctx.kv("target.remote_root:", &target.remote_root);
        if let Some(known_hosts) = &target.known_hosts {
            self.ctx.kv("known_hosts:", &known_hosts.display().to_string());
        }
        self.ctx
            .kv("host_key_policy:", target.host_key_policy.as_str());
        self.ctx.kv("plan:", config.plan.as_str());
        self.ctx
            .kv("connect_timeout:", &format!("{}s", config.connect_timeout_secs));

        println!();
        println!("  {}", "Transfer:".style(self.ctx.styles.section));
        if config.transfer.is_empty() {
            println!("    (none)");
        }
        for item in &config.transfer {
            println!(
                "    {} → {}",
                item.local.display(),
                crate::domain::config::resolve_remote_path(&target.remote_root, &item.remote)
            );
        }

        if let Some(env) = &config.environment {
            println!();
            println!("  {}", "Environment file:".style(self.ctx.styles.section));
            println!("    {} → {}", env.local.display(), env.remote);
            if !env.required_keys.is_empty() {
                println!("    required: {}", env.required_keys.join(", "));
            }
        }

        println!();
        println!("  {}", "Supervisor:".style(self.ctx.styles.section));
        println!("    {:<9} {}", "restart:", config.restart.command);
        println!("    {:<9} {}", "status:", config.restart.status);

        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.section));
        for var in ["HOIST_CONFIG", "HOIST_HOST", "HOIST_USER", "HOIST_LOG", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!(
            "    {:<18} {}",
            "HOIST_PASSWORD:",
            if std::env::var("HOIST_PASSWORD").is_ok() {
                "(set)"
            } else {
                "(not set)"
            }
        );
        println!();
        Ok(())
    }

    /// Render the outcome of `config check`.
    pub fn render_config_check(&self, path: &Path, problems: &[String]) -> Result<()> {
        if problems.is_empty() {
            self.ctx
                .success(&format!("{} is valid", path.display()));
            return Ok(());
        }
        for problem in problems {
            self.ctx.error(problem);
        }
        Ok(())
    }
}

/// How the run will authenticate, without revealing any secret.
#[must_use]
pub fn auth_display(config: &DeployConfig) -> String {
    match config.target.configured_credential() {
        Some(credential) => match &credential {
            crate::domain::config::Credential::IdentityFile { path, .. } => {
                format!("{} ({})", credential.kind(), path.display())
            }
            _ => format!("{} (set)", credential.kind()),
        },
        None => "prompt, then ssh-agent".to_string(),
    }
}

/// ` in 3.2s` style suffix; empty for negative durations.
#[must_use]
pub fn format_elapsed(millis: i64) -> String {
    if millis < 0 {
        return String::new();
    }
    #[allow(clippy::cast_precision_loss)]
    let secs = millis as f64 / 1000.0;
    format!(" in {secs:.1}s")
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("1 {word}")
    } else {
        format!("{n} {word}s")
    }
}
