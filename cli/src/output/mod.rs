//! Terminal and JSON output.
//!
//! Commands never print directly: they hand domain values to a `Renderer`,
//! and application services report progress through `TerminalReporter`.

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::{OwoColorize as _, Style};

pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use std::path::Path;

use anyhow::Result;

use crate::domain::command::SupervisorReport;
use crate::domain::config::DeployConfig;
use crate::domain::run::RunSummary;

/// Dispatches rendering to the human or JSON renderer.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => r.render_version(version),
            Self::Json(_) => JsonRenderer::render_version(version),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_summary(&self, summary: &RunSummary) -> Result<()> {
        match self {
            Self::Human(r) => r.render_summary(summary),
            Self::Json(_) => JsonRenderer::render_summary(summary),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_status(&self, host: &str, report: &SupervisorReport) -> Result<()> {
        match self {
            Self::Human(r) => r.render_status(host, report),
            Self::Json(_) => JsonRenderer::render_status(host, report),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &DeployConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => r.render_config(config, path),
            Self::Json(_) => JsonRenderer::render_config(config, path),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config_check(&self, path: &Path, problems: &[String]) -> Result<()> {
        match self {
            Self::Human(r) => r.render_config_check(path, problems),
            Self::Json(_) => JsonRenderer::render_config_check(path, problems),
        }
    }
}

/// Terminal state shared by the renderers and the progress reporter.
///
/// Status lines go to stdout, errors to stderr. With `quiet` only errors are
/// printed.
pub struct OutputContext {
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used only on a TTY, and never with `--no-color` or `NO_COLOR`.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let colored = !no_color && is_tty && std::env::var_os("NO_COLOR").is_none();
        Self {
            styles: Styles::for_terminal(colored),
            is_tty,
            quiet,
        }
    }

    /// Spinners only make sense on an interactive, non-quiet stdout.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    fn status_line(&self, mark: &str, style: Style, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", mark.style(style));
        }
    }

    pub fn step(&self, msg: &str) {
        self.status_line(styles::MARK_STEP, self.styles.progress, msg);
    }

    pub fn success(&self, msg: &str) {
        self.status_line(styles::MARK_OK, self.styles.ok, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.status_line(styles::MARK_WARN, self.styles.warning, msg);
    }

    /// Printed to stderr even when quiet.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", styles::MARK_FAIL.style(self.styles.failure));
    }

    pub fn info(&self, msg: &str) {
        self.status_line(styles::MARK_NOTE, self.styles.note, msg);
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.title));
        }
    }

    /// `key` padded to a fixed column, then `value`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<18} {value}", key.style(self.styles.label));
        }
    }

    /// Remote output, indented under the step that produced it.
    pub fn block(&self, text: &str) {
        if !self.quiet {
            for line in text.lines() {
                println!("    {line}");
            }
        }
    }
}
