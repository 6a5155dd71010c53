//! `hoist config`: show and check the deployment configuration.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;
use crate::infra::fs::LocalFs;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets redacted)
    Show,
    /// Validate the configuration and check that local files exist
    Check,
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if `show` cannot load the configuration.
pub fn run(app: &AppContext, cmd: &ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => show_config(app),
        ConfigCommand::Check => check_config(app),
    }
}

fn show_config(app: &AppContext) -> Result<ExitCode> {
    let config = app.config_store.load()?;
    let path = app.config_store.path()?;
    app.renderer().render_config(&config, &path)?;
    Ok(ExitCode::SUCCESS)
}

fn check_config(app: &AppContext) -> Result<ExitCode> {
    let path = app.config_store.path()?;
    let problems = match app.config_store.load() {
        Ok(config) => config_service::check_config(&config, &LocalFs),
        Err(e) => vec![format!("{e:#}")],
    };
    app.renderer().render_config_check(&path, &problems)?;
    Ok(if problems.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
