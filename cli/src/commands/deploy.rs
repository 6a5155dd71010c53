//! `hoist deploy`: run one deployment against the configured host.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ConfigStore as _;
use crate::application::services::config_service;
use crate::application::services::deploy::{self as deploy_service, DeployRequest};
use crate::domain::config::{Plan, validate_config};
use crate::infra::fs::LocalFs;
use crate::infra::prompt::DialoguerPrompt;
use crate::infra::ssh::Ssh2Connector;
use crate::output::TerminalReporter;

/// Arguments for the deploy command.
#[derive(Args)]
pub struct DeployArgs {
    /// Override the plan from the configuration file
    #[arg(long, value_enum)]
    pub plan: Option<Plan>,
}

/// Run the deploy command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the operator
/// cannot be asked for confirmation. Deployment failures are rendered in the
/// summary and reported through the exit code instead.
pub async fn run(app: &AppContext, args: &DeployArgs) -> Result<ExitCode> {
    let mut config = config_service::load_config(&app.config_store)?;
    if let Some(plan) = args.plan {
        config.plan = plan;
        validate_config(&config)?;
    }
    tracing::debug!(config = ?config, path = ?app.config_store.path().ok(), "configuration loaded");

    let replaces = match (config.plan, &config.environment) {
        (Plan::Configure, Some(env)) => format!(" and replace {}", env.remote),
        _ => String::new(),
    };
    let question = format!(
        "Deploy {} file(s) to {}@{}:{}{replaces}?",
        config.transfer.len(),
        config.target.user,
        config.target.host,
        config.target.remote_root
    );
    if !app.confirm(&question, true)? {
        app.output.info("Deployment cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let credential =
        config_service::resolve_credential(&config.target, &DialoguerPrompt::new(app.non_interactive))?;
    let target = config_service::build_target(&config, credential)?;

    let request = DeployRequest {
        target: &target,
        plan: config.plan,
        transfer: &config.transfer,
        environment: config.environment.as_ref(),
        restart: &config.restart,
        connect_timeout: config.connect_timeout(),
    };
    let summary = {
        let reporter = TerminalReporter::new(&app.output);
        deploy_service::deploy(&Ssh2Connector, &LocalFs, &reporter, &request).await
    };

    app.renderer().render_summary(&summary)?;
    Ok(if summary.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
