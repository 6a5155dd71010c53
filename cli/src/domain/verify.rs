//! Key verification over captured remote output.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static KEY_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=").expect("valid regex")
});

/// Key names defined by `KEY=...` lines in `output`.
#[must_use]
pub fn defined_keys(output: &str) -> BTreeSet<&str> {
    output
        .lines()
        .filter_map(|line| KEY_LINE_RE.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Required keys absent from `output`, in the order they were required.
#[must_use]
pub fn missing_keys(output: &str, required: &[String]) -> Vec<String> {
    let defined = defined_keys(output);
    required
        .iter()
        .filter(|key| !defined.contains(key.as_str()))
        .cloned()
        .collect()
}
