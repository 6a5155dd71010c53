//! `hoist status`: show the supervisor status without deploying.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::status::query_status;
use crate::infra::prompt::DialoguerPrompt;
use crate::infra::ssh::Ssh2Connector;
use crate::output::TerminalReporter;

/// Run the status command.
///
/// A status command that exits non-zero or writes to stderr is a warning,
/// not a failure.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the host cannot be
/// reached.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let credential =
        config_service::resolve_credential(&config.target, &DialoguerPrompt::new(app.non_interactive))?;
    let target = config_service::build_target(&config, credential)?;

    let report = {
        let reporter = TerminalReporter::new(&app.output);
        query_status(
            &Ssh2Connector,
            &reporter,
            &target,
            &config.restart,
            config.connect_timeout(),
        )
        .await?
    };

    app.renderer()
        .render_status(&target.display_addr(), &report)?;
    Ok(ExitCode::SUCCESS)
}
