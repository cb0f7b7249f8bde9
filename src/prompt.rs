//! Interactive prompts.
//!
//! The controller talks to the terminal only through [`Prompter`], so a
//! scripted implementation can drive it in tests.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::error::Result;

/// Source of user answers
pub trait Prompter {
    /// Pick one of `items`, returning its index; `items` is never empty
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize>;

    /// Read one line of free text (may be empty)
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Ask a yes/no question, defaulting to no
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Wait for the user before the menu is drawn again
    fn pause(&mut self) -> Result<()>;
}

/// Terminal prompts backed by `dialoguer`
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Prompter for TerminalPrompter {
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?)
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme).with_prompt(prompt).default(false).interact()?)
    }

    fn pause(&mut self) -> Result<()> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt("Press Enter to continue...")
            .allow_empty(true)
            .report(false)
            .interact_text()?;
        Ok(())
    }
}
