//! Hoist CLI - push files, an environment file and a restart to one host

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hoist_cli::cli::Cli;
use hoist_cli::domain::{ConfigError, DeployError};
use hoist_cli::output::json;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("HOIST_LOG").unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn error_code(e: &anyhow::Error) -> &'static str {
    if let Some(deploy) = e.downcast_ref::<DeployError>() {
        return deploy.code();
    }
    if e.downcast_ref::<ConfigError>().is_some() {
        return "config_error";
    }
    "error"
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            match json::format_error(&format!("{e:#}"), error_code(&e)) {
                Ok(body) if json_mode => println!("{body}"),
                _ => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
