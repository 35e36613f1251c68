use anyhow::Result;
use colored::Colorize;

use crate::App;
use crate::ops::git::GitOps;
use crate::ops::prompt::PromptOps;
use crate::workflow::Outcome;
use crate::workflow::Workflow;

impl<G: GitOps, P: PromptOps> App<G, P> {
    /// Rebase the train starting at `first_branch` onto `rebase_target`.
    pub async fn cmd_rebase(
        &self,
        first_branch: &str,
        rebase_target: &str,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let origin = self.checked_out_branch().await?;
        let mut workflow = Workflow::begin(
            &self.git,
            &self.store,
            first_branch,
            rebase_target,
            self.config.workflow_options(),
        )
        .await?;

        let outcome = self.drive(&mut workflow, stdout).await?;
        self.return_to(origin).await?;
        report(outcome, stdout)
    }

    /// Pick the run in progress up where it stopped.
    pub async fn cmd_continue(&self, stdout: &mut impl std::io::Write) -> Result<()> {
        let origin = self.checked_out_branch().await?;
        let mut workflow =
            Workflow::resume(&self.git, &self.store, self.config.workflow_options()).await?;

        let outcome = self.drive(&mut workflow, stdout).await?;
        self.return_to(origin).await?;
        report(outcome, stdout)
    }
}

fn report(outcome: Outcome, stdout: &mut impl std::io::Write) -> Result<()> {
    match outcome {
        Outcome::Pushed => writeln!(stdout, "{}", "Train rebased and pushed".green())?,
        Outcome::PushDeclined => writeln!(stdout, "{}", "Train rebased locally".yellow())?,
    }
    Ok(())
}
