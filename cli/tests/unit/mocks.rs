//! Shared mock infrastructure for unit tests.
//!
//! `FakeHost` stands in for one remote machine: it records every command and
//! upload, keeps written files in memory and answers the two scripts the
//! deployment issues (the environment write and the key grep) the way a
//! POSIX shell would. Anything else returns a scripted or empty result.

#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Result, bail};
use regex::Regex;

use hoist_cli::application::ports::{
    ConfigStore, LocalFs, ProgressReporter, RemoteSession, SecretPrompt, SessionConnector,
};
use hoist_cli::domain::config::{Credential, HostKeyPolicy, RemoteTarget};
use hoist_cli::domain::{CommandResult, DeployConfig};

// ── Result helpers ───────────────────────────────────────────────────────────

pub fn ok_result(stdout: &str) -> CommandResult {
    CommandResult {
        exit_code: 0,
        stdout: stdout.to_string(),
        ..CommandResult::default()
    }
}

pub fn err_result(exit_code: i32, stderr: &str) -> CommandResult {
    CommandResult {
        exit_code,
        stderr: stderr.to_string(),
        ..CommandResult::default()
    }
}

/// A command that died from `signal` without reporting an exit status.
pub fn killed_result(signal: &str) -> CommandResult {
    CommandResult {
        signal: Some(signal.to_string()),
        ..CommandResult::default()
    }
}

pub fn target(host: &str) -> RemoteTarget {
    RemoteTarget {
        host: host.to_string(),
        port: 22,
        user: "deploy".to_string(),
        credential: Credential::Password("pw".to_string()),
        remote_root: "/app".to_string(),
        known_hosts: PathBuf::from("/tmp/hoist-test-known-hosts"),
        host_key_policy: HostKeyPolicy::AcceptNew,
    }
}

// ── Fake remote host ─────────────────────────────────────────────────────────

/// Everything the fake host saw, plus knobs to make it misbehave.
#[derive(Default)]
pub struct HostState {
    pub opened: usize,
    pub closed: usize,
    pub commands: Vec<String>,
    pub uploads: Vec<(PathBuf, String)>,
    /// Remote files written through the environment-write script.
    pub files: BTreeMap<String, String>,
    /// First matching substring wins.
    pub scripted: Vec<(String, CommandResult)>,
    /// Commands containing this substring fail at the transport level.
    pub transport_error_on: Option<String>,
    /// Zero-based upload attempt that fails.
    pub fail_upload_at: Option<usize>,
    pub upload_attempts: usize,
    pub refuse_connect: Option<String>,
    pub fail_close: bool,
    /// stderr returned by the environment-write script, which then exits 1.
    pub write_error: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap()
    }

    pub fn script(&self, substring: &str, result: CommandResult) -> &Self {
        self.state()
            .scripted
            .push((substring.to_string(), result));
        self
    }

    pub fn connector(&self) -> FakeConnector {
        FakeConnector { host: self.clone() }
    }

    /// Commands whose text contains `needle`.
    pub fn commands_containing(&self, needle: &str) -> Vec<String> {
        self.state()
            .commands
            .iter()
            .filter(|c| c.contains(needle))
            .cloned()
            .collect()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.state().files.get(path).cloned()
    }
}

pub struct FakeConnector {
    host: FakeHost,
}

impl SessionConnector for FakeConnector {
    type Session = FakeSession;

    async fn connect(&self, _target: &RemoteTarget, _timeout: Duration) -> Result<FakeSession> {
        let mut state = self.host.state();
        if let Some(reason) = &state.refuse_connect {
            bail!("{reason}");
        }
        state.opened += 1;
        Ok(FakeSession {
            host: self.host.clone(),
        })
    }
}

pub struct FakeSession {
    host: FakeHost,
}

impl RemoteSession for FakeSession {
    async fn run_command(&self, command: &str) -> Result<CommandResult> {
        let mut state = self.host.state();
        state.commands.push(command.to_string());
        if let Some(needle) = &state.transport_error_on {
            if command.contains(needle.as_str()) {
                bail!("channel closed unexpectedly");
            }
        }
        if let Some((_, result)) = state
            .scripted
            .iter()
            .find(|(needle, _)| command.contains(needle.as_str()))
        {
            return Ok(result.clone());
        }
        if command.contains("mktemp") {
            if let Some(stderr) = &state.write_error {
                return Ok(err_result(1, stderr));
            }
            let (dest, payload) = parse_write_script(command);
            state.files.insert(dest, payload);
            return Ok(ok_result(""));
        }
        if command.starts_with("grep -o -E ") {
            return Ok(answer_grep(&state.files, command));
        }
        Ok(ok_result(""))
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        let mut state = self.host.state();
        let attempt = state.upload_attempts;
        state.upload_attempts += 1;
        if state.fail_upload_at == Some(attempt) {
            bail!("permission denied");
        }
        state.uploads.push((local.to_path_buf(), remote.to_string()));
        Ok(())
    }

    async fn close(self) -> Result<()> {
        let mut state = self.host.state();
        state.closed += 1;
        if state.fail_close {
            bail!("connection reset by peer");
        }
        Ok(())
    }
}

/// Pull the destination and heredoc body out of an environment-write script.
pub fn parse_write_script(script: &str) -> (String, String) {
    let start = script.find("<<'").expect("heredoc start") + 3;
    let delim_end = start + script[start..].find('\'').expect("delimiter end");
    let delimiter = &script[start..delim_end];
    let body_start = delim_end + 2;
    let body_end = body_start
        + script[body_start..]
            .find(&format!("{delimiter}\nmv -f"))
            .expect("heredoc end");
    let payload = script[body_start..body_end].to_string();

    let mv_line = script
        .lines()
        .find(|l| l.starts_with("mv -f "))
        .expect("mv line");
    let dest = mv_line
        .rsplit(' ')
        .next()
        .expect("destination")
        .trim_matches('\'')
        .to_string();
    (dest, payload)
}

/// Behave like `grep -o -E '<pattern>' '<path>'` over the in-memory files.
fn answer_grep(files: &BTreeMap<String, String>, command: &str) -> CommandResult {
    let rest = command.trim_start_matches("grep -o -E '");
    let split = rest.rfind("' '").expect("pattern/path separator");
    let pattern = &rest[..split];
    let path = rest[split + 3..].trim_end_matches('\'');

    let Some(content) = files.get(path) else {
        return err_result(2, &format!("grep: {path}: No such file or directory"));
    };
    let re = Regex::new(pattern).expect("grep pattern is a valid regex");
    let matched: Vec<&str> = content
        .lines()
        .filter_map(|line| re.find(line).map(|m| m.as_str()))
        .collect();
    if matched.is_empty() {
        return err_result(1, "");
    }
    ok_result(&format!("{}\n", matched.join("\n")))
}

// ── Reporters ────────────────────────────────────────────────────────────────

/// Discards every event.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
    fn error(&self, _: &str) {}
    fn output(&self, _: &str) {}
}

/// Records `(kind, message)` pairs in order.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<(&'static str, String)> {
        self.events.lock().unwrap().clone()
    }

    pub fn of_kind(&self, kind: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m)
            .collect()
    }

    fn push(&self, kind: &'static str, message: &str) {
        self.events.lock().unwrap().push((kind, message.to_string()));
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.push("step", message);
    }
    fn success(&self, message: &str) {
        self.push("success", message);
    }
    fn warn(&self, message: &str) {
        self.push("warn", message);
    }
    fn error(&self, message: &str) {
        self.push("error", message);
    }
    fn output(&self, text: &str) {
        self.push("output", text);
    }
}

// ── Local filesystem ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeFs {
    files: BTreeMap<PathBuf, String>,
}

impl FakeFs {
    pub fn with(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(p, c)| (PathBuf::from(p), (*c).to_string()))
                .collect(),
        }
    }
}

impl LocalFs for FakeFs {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.files.get(path) {
            Some(content) => Ok(content.clone()),
            None => bail!("reading file {}: not found", path.display()),
        }
    }
}

// ── Config and prompt ────────────────────────────────────────────────────────

pub struct FakeStore {
    pub config: DeployConfig,
}

impl ConfigStore for FakeStore {
    fn load(&self) -> Result<DeployConfig> {
        Ok(self.config.clone())
    }

    fn path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("/work/hoist.yaml"))
    }
}

/// Answers every prompt with a fixed value and counts how often it was asked.
pub struct FixedPrompt {
    answer: Option<String>,
    pub asked: Mutex<usize>,
}

impl FixedPrompt {
    pub fn answering(answer: Option<&str>) -> Self {
        Self {
            answer: answer.map(str::to_string),
            asked: Mutex::new(0),
        }
    }

    pub fn times_asked(&self) -> usize {
        *self.asked.lock().unwrap()
    }
}

impl SecretPrompt for FixedPrompt {
    fn password(&self, _prompt: &str) -> Result<Option<String>> {
        *self.asked.lock().unwrap() += 1;
        Ok(self.answer.clone())
    }
}
