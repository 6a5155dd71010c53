//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Push files, an environment file and a restart to one remote host over SSH
#[derive(Parser)]
#[command(
    name = "hoist",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log debug detail to stderr (overridden by HOIST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation and password prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Configuration file [default: $HOIST_CONFIG or ./hoist.yaml]
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload files, optionally write the environment file, restart
    Deploy(commands::deploy::DeployArgs),

    /// Show the supervisor status on the remote host
    Status,

    /// Inspect configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails before producing its own output.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            yes,
            config,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
            config_path: config,
        });
        match command {
            Command::Deploy(args) => commands::deploy::run(&app, &args).await,
            Command::Status => commands::status::run(&app).await,
            Command::Config(cmd) => commands::config::run(&app, &cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
