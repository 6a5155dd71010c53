//! Unit tests for `YamlConfigStore` location and environment overrides.
//!
//! These tests mutate process environment variables, so each one is
//! `#[serial]`.

#![allow(clippy::expect_used, clippy::unwrap_used, unsafe_code)]

use std::path::PathBuf;

use serial_test::serial;
use tempfile::TempDir;

use hoist_cli::application::ports::ConfigStore;
use hoist_cli::infra::config::YamlConfigStore;

const VARS: [&str; 4] = ["HOIST_CONFIG", "HOIST_HOST", "HOIST_USER", "HOIST_PASSWORD"];

fn clear_env() {
    for var in VARS {
        // SAFETY: every test touching these variables is #[serial].
        unsafe { std::env::remove_var(var) };
    }
}

fn write_config(dir: &TempDir, yaml: &str) -> PathBuf {
    let path = dir.path().join("hoist.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

const YAML: &str = "\
target:
  host: 10.0.0.1
  user: deploy
  remote_root: /app
  known_hosts: known_hosts
transfer:
  - local: a.ts
    remote: a.ts
";

#[test]
#[serial]
fn hoist_config_env_is_used_without_flag() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, YAML);
    // SAFETY: #[serial]
    unsafe { std::env::set_var("HOIST_CONFIG", &path) };

    let store = YamlConfigStore::new(None);
    assert_eq!(store.path().unwrap(), path);
    assert_eq!(store.load().unwrap().target.host, "10.0.0.1");
    clear_env();
}

#[test]
#[serial]
fn flag_wins_over_env() {
    clear_env();
    // SAFETY: #[serial]
    unsafe { std::env::set_var("HOIST_CONFIG", "/nonexistent/hoist.yaml") };
    let store = YamlConfigStore::new(Some(PathBuf::from("/tmp/explicit.yaml")));
    assert_eq!(store.path().unwrap(), PathBuf::from("/tmp/explicit.yaml"));
    clear_env();
}

#[test]
#[serial]
fn default_is_hoist_yaml_in_working_directory() {
    clear_env();
    assert_eq!(YamlConfigStore::new(None).path().unwrap(), PathBuf::from("hoist.yaml"));
}

#[test]
#[serial]
fn env_overrides_apply_on_load() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, YAML);
    // SAFETY: #[serial]
    unsafe {
        std::env::set_var("HOIST_HOST", "10.0.0.2");
        std::env::set_var("HOIST_PASSWORD", "from-env");
    }

    let config = YamlConfigStore::new(Some(path)).load().unwrap();

    assert_eq!(config.target.host, "10.0.0.2");
    assert_eq!(config.target.user, "deploy");
    assert_eq!(config.target.password.as_deref(), Some("from-env"));
    clear_env();
}

#[test]
#[serial]
fn relative_paths_follow_the_config_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, YAML);

    let config = YamlConfigStore::new(Some(path)).load().unwrap();

    assert_eq!(config.transfer[0].local, dir.path().join("a.ts"));
    assert_eq!(config.target.known_hosts, Some(dir.path().join("known_hosts")));
}

#[test]
#[serial]
fn malformed_yaml_names_the_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "target: [unclosed\n");

    let err = YamlConfigStore::new(Some(path.clone())).load().unwrap_err();

    assert!(err.to_string().contains(&path.display().to_string()), "got: {err}");
}
