//! Operator prompts.
//!
//! Interactive questions go through the [`Prompter`] trait so that platform
//! selection and the dotfiles update question can be driven from tests and
//! from `--yes` runs without a terminal.
use anyhow::{Context as _, Result, bail};
use dialoguer::{Confirm, Input};

/// Source of answers to interactive questions.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;

    /// Read one line of free-form input.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn input(&self, message: &str) -> Result<String>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(message)
            .default(default)
            .interact()
            .context("failed to read confirmation")
    }

    fn input(&self, message: &str) -> Result<String> {
        let answer: String = Input::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .context("failed to read input")?;
        Ok(answer.trim().to_string())
    }
}

/// Answers every confirmation with "yes" and refuses free-form questions.
///
/// Used for `--yes` runs, where nothing may block on the terminal.
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, _message: &str, _default: bool) -> Result<bool> {
        Ok(true)
    }

    fn input(&self, message: &str) -> Result<String> {
        bail!("cannot answer '{message}' non-interactively")
    }
}
