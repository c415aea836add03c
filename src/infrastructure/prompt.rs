//! Interactive credential collection
//!
//! Used when a chart repository or the image pull secret needs credentials
//! that the config did not supply.

use dialoguer::{Input, Password};

use crate::error::CredentialError;

/// Source of credentials typed in by the operator
pub trait Prompter {
    /// Read a visible value such as a username or email address
    fn input(&self, field: &str, prompt: &str) -> Result<String, CredentialError>;

    /// Read a value without echoing it
    fn password(&self, field: &str, prompt: &str) -> Result<String, CredentialError>;
}

/// Prompts on the controlling terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&self, field: &str, prompt: &str) -> Result<String, CredentialError> {
        Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| CredentialError::PromptFailed {
                field: field.to_string(),
                message: e.to_string(),
            })
    }

    fn password(&self, field: &str, prompt: &str) -> Result<String, CredentialError> {
        Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|e| CredentialError::PromptFailed {
                field: field.to_string(),
                message: e.to_string(),
            })
    }
}

/// Which kind of prompt a missing value needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secrecy {
    Visible,
    Hidden,
}

/// Use `current` when set, otherwise ask for it
pub fn value_or_prompt<P: Prompter>(
    prompter: &P,
    current: &str,
    field: &str,
    prompt: &str,
    secrecy: Secrecy,
) -> Result<String, CredentialError> {
    if !current.is_empty() {
        return Ok(current.to_string());
    }
    match secrecy {
        Secrecy::Visible => prompter.input(field, prompt),
        Secrecy::Hidden => prompter.password(field, prompt),
    }
}
