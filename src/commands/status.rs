use anyhow::Result;
use colored::ColoredString;
use colored::Colorize;

use crate::App;
use crate::model::Status;
use crate::ops::git::GitOps;
use crate::ops::prompt::PromptOps;

impl<G: GitOps, P: PromptOps> App<G, P> {
    pub async fn cmd_status(&self, stdout: &mut impl std::io::Write) -> Result<()> {
        if !self.store.is_in_progress().await? {
            writeln!(stdout, "No train rebase in progress")?;
            return Ok(());
        }
        let train = self.store.read().await?;

        let root = train.rebase_root();
        writeln!(
            stdout,
            "Train rebase in progress onto \"{}\" {}",
            root.name,
            root.short_hash().cyan()
        )?;

        let width = train
            .branches()
            .iter()
            .map(|branch| branch.name.len())
            .max()
            .unwrap_or(0);
        for branch in train.branches() {
            let line = format!(
                "  {:<width$}  {} {}",
                branch.name,
                colored_status(branch.status()),
                branch.short_hash().cyan()
            );
            writeln!(stdout, "{}", line.trim_end())?;
        }

        // Where a stopped run picks up again
        for (label, status) in [("rebased", Status::Rebased), ("reviewed", Status::Reviewed)] {
            if let Ok(anchor) = train.last_of_status(status) {
                writeln!(stdout, "Last {label}: {}", anchor.name.bold())?;
            }
        }
        Ok(())
    }
}

fn colored_status(status: Status) -> ColoredString {
    let text = format!("{:<8}", status.to_string());
    match status {
        Status::Found => text.white(),
        Status::Rebased => text.yellow(),
        Status::Reviewed => text.blue(),
        Status::Pushed => text.green(),
    }
}
