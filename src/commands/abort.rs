use anyhow::Result;
use colored::Colorize;

use crate::App;
use crate::model::branch::abbreviate_hash;
use crate::ops::git::GitOps;
use crate::ops::prompt::PromptOps;
use crate::workflow;

impl<G: GitOps, P: PromptOps> App<G, P> {
    /// Throw the run in progress away, resetting every branch to its upstream.
    pub async fn cmd_abort(&self, stdout: &mut impl std::io::Write) -> Result<()> {
        let origin = self.checked_out_branch().await?;
        let resets = workflow::abort(&self.git, &self.store).await?;

        for reset in &resets {
            writeln!(
                stdout,
                "Reset \"{}\" from {} to {}",
                reset.branch,
                abbreviate_hash(&reset.from).yellow(),
                abbreviate_hash(&reset.to).cyan()
            )?;
        }
        self.return_to(origin).await?;
        writeln!(stdout, "Train rebase aborted")?;
        Ok(())
    }
}
