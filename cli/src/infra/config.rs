//! Infrastructure implementation of the `ConfigStore` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::DeployConfig;

/// Default file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "hoist.yaml";

/// Production implementation of `ConfigStore` that reads a YAML file on disk.
///
/// Location: explicit path, else `HOIST_CONFIG`, else `./hoist.yaml`.
/// `HOIST_HOST`, `HOIST_USER` and `HOIST_PASSWORD` override the file.
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<DeployConfig> {
        let path = self.path()?;
        if !path.exists() {
            anyhow::bail!(
                "no configuration at {}\n\nCreate {DEFAULT_CONFIG_FILE} or pass --config <path>.",
                path.display()
            );
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let mut config: DeployConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?;

        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let home = dirs::home_dir();
        resolve_paths(&mut config, base, home.as_deref())?;
        Ok(config)
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit {
            return Ok(path.clone());
        }
        if let Ok(val) = std::env::var("HOIST_CONFIG") {
            return Ok(PathBuf::from(val));
        }
        Ok(PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}

/// Apply `HOIST_*` variables on top of the file. Empty values are ignored.
fn apply_env_overrides(config: &mut DeployConfig, var: impl Fn(&str) -> Option<String>) {
    let var = |key: &str| var(key).filter(|v| !v.is_empty());
    if let Some(host) = var("HOIST_HOST") {
        config.target.host = host;
    }
    if let Some(user) = var("HOIST_USER") {
        config.target.user = user;
    }
    if let Some(password) = var("HOIST_PASSWORD") {
        config.target.password = Some(password);
    }
}

/// Make every local path usable from any working directory.
///
/// Relative paths are taken from the config file's directory, `~/` expands
/// to the home directory, and an unset `known_hosts` defaults to
/// `~/.hoist/known_hosts`.
fn resolve_paths(config: &mut DeployConfig, base: &Path, home: Option<&Path>) -> Result<()> {
    for item in &mut config.transfer {
        item.local = local_path(&item.local, base, home)?;
    }
    if let Some(env) = &mut config.environment {
        env.local = local_path(&env.local, base, home)?;
    }
    if let Some(identity) = &config.target.identity_file {
        config.target.identity_file = Some(local_path(identity, base, home)?);
    }
    config.target.known_hosts = Some(match &config.target.known_hosts {
        Some(path) => local_path(path, base, home)?,
        None => home
            .context("cannot determine home directory for the default known_hosts file")?
            .join(".hoist")
            .join("known_hosts"),
    });
    Ok(())
}

fn local_path(path: &Path, base: &Path, home: Option<&Path>) -> Result<PathBuf> {
    if let Ok(rest) = path.strip_prefix("~") {
        let home = home.context("cannot determine home directory")?;
        return Ok(home.join(rest));
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(base.join(path))
}
