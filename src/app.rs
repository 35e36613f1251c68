use anyhow::Result;
use colored::Colorize;
use tracing::debug;

use crate::config::Config;
use crate::ops::git::GitOps;
use crate::ops::prompt::PromptOps;
use crate::store::StatusStore;
use crate::workflow::Outcome;
use crate::workflow::Prompt;
use crate::workflow::Step;
use crate::workflow::Workflow;

pub struct App<G: GitOps, P: PromptOps> {
    pub config: Config,
    pub git: G,
    pub prompt: P,
    pub store: StatusStore,
}

impl<G: GitOps, P: PromptOps> App<G, P> {
    pub fn new(config: Config, git: G, prompt: P, store: StatusStore) -> Self {
        Self {
            config,
            git,
            prompt,
            store,
        }
    }
}

/// Shared helper methods for App
impl<G: GitOps, P: PromptOps> App<G, P> {
    /// Run `workflow` to the end, putting every prompt to the operator.
    pub(crate) async fn drive(
        &self,
        workflow: &mut Workflow<'_, G>,
        stdout: &mut impl std::io::Write,
    ) -> Result<Outcome> {
        loop {
            match workflow.advance(stdout).await? {
                Step::Confirm(prompt) => {
                    if let Prompt::Review(artifact) = &prompt {
                        writeln!(stdout)?;
                        writeln!(stdout, "{}", artifact.to_string().cyan())?;
                        writeln!(stdout)?;
                    }
                    let accepted = self
                        .prompt
                        .confirm(prompt.question(), prompt.default_answer())?;
                    workflow.respond(accepted, stdout).await?;
                }
                Step::Done(outcome) => return Ok(outcome),
            }
        }
    }

    /// The branch checked out right now, if HEAD is on a local branch.
    pub(crate) async fn checked_out_branch(&self) -> Result<Option<String>> {
        let current = self.git.current_branch().await?;
        let branches = self.git.list_local_branches().await?;
        Ok(branches.contains(&current).then_some(current))
    }

    /// Check `branch` out again unless it is already current or gone.
    pub(crate) async fn return_to(&self, branch: Option<String>) -> Result<()> {
        let Some(branch) = branch else {
            return Ok(());
        };
        if !self.git.list_local_branches().await?.contains(&branch) {
            debug!(%branch, "original branch no longer exists");
            return Ok(());
        }
        if self.git.current_branch().await? != branch {
            self.git.checkout(&branch).await?;
        }
        Ok(())
    }
}
