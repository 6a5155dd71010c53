//! Colors and status marks shared by every human-readable line.

use owo_colors::Style;

use crate::domain::run::Outcome;

pub const MARK_OK: &str = "✓";
pub const MARK_WARN: &str = "⚠";
pub const MARK_FAIL: &str = "✗";
pub const MARK_STEP: &str = "→";
pub const MARK_NOTE: &str = "ℹ";

/// Stylesheet for terminal output. `Default` is the uncolored sheet.
#[derive(Default, Clone, Copy)]
pub struct Styles {
    pub ok: Style,
    pub warning: Style,
    pub failure: Style,
    pub note: Style,
    /// In-flight steps.
    pub progress: Style,
    /// Keys in key/value listings.
    pub label: Style,
    /// Sub-headings such as `Transfer:`.
    pub section: Style,
    pub title: Style,
}

impl Styles {
    /// The colored sheet, or the plain one when `enabled` is false.
    #[must_use]
    pub fn for_terminal(enabled: bool) -> Self {
        if !enabled {
            return Self::default();
        }
        Self {
            ok: Style::new().green(),
            warning: Style::new().yellow(),
            failure: Style::new().red(),
            note: Style::new().blue(),
            progress: Style::new().cyan(),
            label: Style::new().dimmed(),
            section: Style::new().bold(),
            title: Style::new().bold().cyan(),
        }
    }

    /// Mark and style for one step outcome in the run log.
    #[must_use]
    pub fn outcome(&self, outcome: Outcome) -> (&'static str, Style) {
        match outcome {
            Outcome::Ok => (MARK_OK, self.ok),
            Outcome::Warning => (MARK_WARN, self.warning),
            Outcome::Failed => (MARK_FAIL, self.failure),
        }
    }
}
