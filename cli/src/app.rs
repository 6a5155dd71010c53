//! Per-invocation context handed to every command handler.

use std::path::PathBuf;

use anyhow::Result;
use console::Term;

use crate::infra::config::YamlConfigStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Environment variables that imply `--yes`.
const NON_INTERACTIVE_VARS: &[&str] = &["CI", "HOIST_YES"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// How results are printed.
pub struct OutputFlags {
    pub no_color: bool,
    pub quiet: bool,
    pub json: bool,
}

/// Whether the operator may be asked anything.
pub struct BehaviourFlags {
    pub yes: bool,
}

/// Global flags, already parsed by clap.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
    /// `--config <path>`.
    pub config_path: Option<PathBuf>,
}

pub struct AppContext {
    /// Quiet whenever JSON is requested, so progress lines never end up in
    /// the JSON document on stdout.
    pub output: OutputContext,
    pub mode: OutputMode,
    pub config_store: YamlConfigStore,
    /// No confirmation or password prompts: `--yes`, `CI` or `HOIST_YES`.
    pub non_interactive: bool,
}

impl AppContext {
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let env_says_yes = NON_INTERACTIVE_VARS
            .iter()
            .any(|var| std::env::var_os(var).is_some());
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            output: OutputContext::new(
                flags.output.no_color,
                flags.output.quiet || flags.output.json,
            ),
            mode,
            config_store: YamlConfigStore::new(flags.config_path.clone()),
            non_interactive: flags.behaviour.yes || env_says_yes,
        }
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Yes/no question on the terminal.
    ///
    /// Answers `default` without asking when non-interactive or when stdout
    /// is not a terminal (piped output, `--json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive || self.is_json() || !Term::stdout().is_term() {
            return Ok(default);
        }
        Ok(dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}
