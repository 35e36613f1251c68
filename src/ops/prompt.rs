use anyhow::Result;
use dialoguer::Confirm;
#[cfg(test)]
use mockall::automock;

/// Yes/no questions put to the operator.
#[cfg_attr(test, automock)]
pub trait PromptOps {
    fn confirm(&self, question: &str, default: bool) -> Result<bool>;
}

/// Real implementation that asks on the controlling terminal.
pub struct TerminalPrompt;

impl PromptOps for TerminalPrompt {
    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()?;
        Ok(answer)
    }
}
