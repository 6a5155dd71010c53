//! Spinner shown while a deployment step is in flight.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::output::styles::MARK_OK;

const TICK: Duration = Duration::from_millis(80);
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "];

fn style(template: &str) -> ProgressStyle {
    // Templates are literals, so the fallback is never taken in practice.
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Start a ticking spinner labelled `msg`.
#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner()
        .with_style(style("  {spinner:.cyan} {msg}").tick_strings(FRAMES))
        .with_message(msg.to_string());
    pb.enable_steady_tick(TICK);
    pb
}

/// Freeze the spinner line as a completed step.
pub fn finish_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(style("  {prefix} {msg}"));
    pb.set_prefix(MARK_OK);
    pb.finish_with_message(msg.to_string());
}

/// Remove the spinner line entirely.
pub fn clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}
