//! Shared helpers: a hoist command with a sandboxed environment and a
//! throwaway project directory.

#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// `hoist` with colors off and every `HOIST_*` variable cleared.
pub fn hoist() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hoist"));
    cmd.env("NO_COLOR", "1");
    for var in [
        "HOIST_CONFIG",
        "HOIST_HOST",
        "HOIST_USER",
        "HOIST_PASSWORD",
        "HOIST_LOG",
        "HOIST_YES",
        "CI",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// A temp directory holding `hoist.yaml` and whatever local files the test adds.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new(yaml: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("hoist.yaml"), yaml).expect("write config");
        Self { dir }
    }

    pub fn config(&self) -> PathBuf {
        self.dir.path().join("hoist.yaml")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn add_file(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// `hoist -c <project>/hoist.yaml` with `HOME` inside the project.
    pub fn hoist(&self) -> Command {
        let mut cmd = hoist();
        cmd.env("HOME", self.dir.path()).arg("--config").arg(self.config());
        cmd
    }
}

/// A config pointing at a local port nothing listens on.
pub const UNREACHABLE: &str = "\
target:
  host: 127.0.0.1
  port: 1
  user: deploy
  password: hunter2
  remote_root: /app
connect_timeout_secs: 2
transfer:
  - local: src/a.ts
    remote: a.ts
";
