//! Terminal implementation of the `SecretPrompt` port.

use anyhow::{Context, Result};
use console::Term;

use crate::application::ports::SecretPrompt;

/// Asks for secrets on the controlling terminal via `dialoguer`.
pub struct DialoguerPrompt {
    non_interactive: bool,
}

impl DialoguerPrompt {
    /// `non_interactive` mirrors `AppContext::non_interactive`.
    #[must_use]
    pub fn new(non_interactive: bool) -> Self {
        Self { non_interactive }
    }
}

impl SecretPrompt for DialoguerPrompt {
    fn password(&self, prompt: &str) -> Result<Option<String>> {
        if self.non_interactive || !Term::stderr().is_term() {
            return Ok(None);
        }
        let password = dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .context("reading password")?;
        Ok(Some(password))
    }
}
