//! Application service: configuration use-cases.

use anyhow::{Context, Result};

use crate::application::ports::{ConfigStore, LocalFs, SecretPrompt};
use crate::domain::config::{
    Credential, DeployConfig, RemoteTarget, TargetConfig, validate_config,
};

/// Load and validate the configuration.
///
/// # Errors
///
/// Returns an error if the store cannot load it or validation fails.
pub fn load_config(store: &impl ConfigStore) -> Result<DeployConfig> {
    let config = store.load()?;
    validate_config(&config).with_context(|| match store.path() {
        Ok(path) => format!("invalid configuration in {}", path.display()),
        Err(_) => "invalid configuration".to_string(),
    })?;
    Ok(config)
}

/// Pick the credential for this run.
///
/// Configured password, then identity file, then an interactive password
/// prompt, and finally ssh-agent when nobody can be asked.
///
/// # Errors
///
/// Returns an error if the prompt fails.
pub fn resolve_credential(target: &TargetConfig, prompt: &impl SecretPrompt) -> Result<Credential> {
    if let Some(credential) = target.configured_credential() {
        return Ok(credential);
    }
    let question = format!("Password for {}@{}", target.user, target.host);
    match prompt.password(&question)? {
        Some(password) if !password.is_empty() => Ok(Credential::Password(password)),
        _ => {
            tracing::debug!("no password configured or entered, falling back to ssh-agent");
            Ok(Credential::Agent)
        }
    }
}

/// Build the immutable run target.
///
/// # Errors
///
/// Returns an error if the store did not resolve a known-hosts path.
pub fn build_target(config: &DeployConfig, credential: Credential) -> Result<RemoteTarget> {
    let known_hosts = config
        .target
        .known_hosts
        .clone()
        .context("known_hosts path not resolved")?;
    Ok(RemoteTarget::from_config(&config.target, credential, known_hosts))
}

/// Everything `config check` can find wrong without touching the network.
///
/// Returns one message per problem; empty means ready to deploy.
pub fn check_config(config: &DeployConfig, local_fs: &impl LocalFs) -> Vec<String> {
    let mut problems = Vec::new();
    if let Err(e) = validate_config(config) {
        problems.push(e.to_string());
    }
    for item in &config.transfer {
        if !local_fs.is_file(&item.local) {
            problems.push(format!("transfer source not found: {}", item.local.display()));
        }
    }
    if let Some(env) = &config.environment {
        if !local_fs.is_file(&env.local) {
            problems.push(format!("environment file not found: {}", env.local.display()));
        }
    }
    if let Some(identity) = &config.target.identity_file {
        if !local_fs.is_file(identity) {
            problems.push(format!("identity file not found: {}", identity.display()));
        }
    }
    problems
}
