//! Rendering of remote shell commands.
//!
//! Everything that ends up in a remote `sh -c` string is built here so quoting
//! lives in one place. Pure string functions, no I/O.

/// Base heredoc delimiter; a numeric suffix is added if the payload contains it.
pub const HEREDOC_DELIMITER: &str = "HOIST_EOF";

/// Single-quote `s` for a POSIX shell.
///
/// Inside single quotes nothing is special, so the only character to handle
/// is the single quote itself, written as `'\''`.
#[must_use]
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Run `command` from inside `dir`.
#[must_use]
pub fn in_dir(dir: &str, command: &str) -> String {
    format!("cd {} && {command}", quote(dir))
}

/// Normalize line endings to LF and make sure the text ends with a newline.
///
/// A lone `\r` at the very end counts as a CRLF whose LF was cut off.
#[must_use]
pub fn normalize_payload(raw: &str) -> String {
    let mut text = raw.replace("\r\n", "\n");
    if text.ends_with('\r') {
        text.pop();
        text.push('\n');
    }
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Pick a delimiter that never appears as a whole line of `payload`.
#[must_use]
pub fn heredoc_delimiter(payload: &str) -> String {
    let mut delimiter = HEREDOC_DELIMITER.to_string();
    let mut suffix = 0u32;
    while payload.lines().any(|line| line == delimiter) {
        suffix += 1;
        delimiter = format!("{HEREDOC_DELIMITER}_{suffix}");
    }
    delimiter
}

/// Script that replaces `path` with `payload` in one step.
///
/// The payload goes through a quoted heredoc, so `$`, quotes and backticks
/// arrive literally. It is written to a `mktemp` sibling of `path` (mode
/// 0600) and renamed over the destination; the trap removes the temporary
/// file on every exit path. `payload` must already be normalized.
#[must_use]
pub fn write_file_script(path: &str, payload: &str) -> String {
    let (dir, name) = path.rsplit_once('/').unwrap_or((".", path));
    let template = format!("{dir}/.{name}.XXXXXX");
    let delimiter = heredoc_delimiter(payload);
    format!(
        "set -e\n\
         tmp=$(mktemp {template})\n\
         trap 'rm -f \"$tmp\"' EXIT\n\
         cat > \"$tmp\" <<'{delimiter}'\n\
         {payload}{delimiter}\n\
         mv -f \"$tmp\" {dest}\n",
        template = quote(&template),
        dest = quote(path),
    )
}

/// Query printing only the `KEY=` prefix of each line defining one of `keys`.
///
/// `-o` keeps values (often secrets) on the remote side. Key names must have
/// passed `validate_key_name`.
#[must_use]
pub fn grep_keys_command(path: &str, keys: &[String]) -> String {
    let pattern = format!("^[[:space:]]*(export[[:space:]]+)?({})=", keys.join("|"));
    format!("grep -o -E {} {}", quote(&pattern), quote(path))
}
