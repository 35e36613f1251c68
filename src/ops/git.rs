#![allow(async_fn_in_trait)]

use std::path::Path;
use std::path::PathBuf;

use log::debug;
#[cfg(test)]
use mockall::automock;
use tokio::process::Command;

use crate::error::Error;
use crate::error::Result;

// -----------------------------------------------------------------------------
// GitOps trait

/// Outcome of `git rebase`. A failed rebase is an expected result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseOutcome {
    Success,
    Failed(String),
}

/// Operations for interacting with Git
#[cfg_attr(test, automock)]
pub trait GitOps {
    /// Local branch names in listing order.
    async fn list_local_branches(&self) -> Result<Vec<String>>;
    async fn current_branch(&self) -> Result<String>;

    /// Local branches whose history contains `commitish`.
    async fn branches_containing(&self, commitish: &str) -> Result<Vec<String>>;
    async fn resolve_commit(&self, reference: &str) -> Result<String>;

    /// Short name of the upstream tracking ref of `branch`, e.g. `origin/feature`.
    async fn upstream_of(&self, branch: &str) -> Result<String>;
    async fn checkout(&self, branch: &str) -> Result<()>;
    async fn rebase(&self, onto: &str) -> Result<RebaseOutcome>;
    async fn rebase_in_progress(&self) -> Result<bool>;
    async fn abort_rebase(&self) -> Result<()>;
    async fn push_force_with_lease(&self, branch: &str) -> Result<()>;
    async fn reset_hard(&self, reference: &str) -> Result<()>;

    /// Whether the local tip of `branch` equals the tip of its upstream.
    /// A branch without upstream is never synchronized.
    async fn is_synchronized_with_upstream(&self, branch: &str) -> Result<bool>;
}

// -----------------------------------------------------------------------------
// GitClient

/// Real implementation that calls the git CLI inside one working copy.
pub struct GitClient {
    path: PathBuf,
    git_dir: PathBuf,
}

impl GitClient {
    /// Locate the repository containing `path` and bind to its top level.
    pub async fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toplevel = run_git(path, &["rev-parse", "--show-toplevel"]).await?;
        let git_dir = run_git(path, &["rev-parse", "--absolute-git-dir"]).await?;
        Ok(Self {
            path: PathBuf::from(toplevel),
            git_dir: PathBuf::from(git_dir),
        })
    }

    /// Repository top level.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The repository control directory, usually `<path>/.git`.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        run_git(&self.path, args).await
    }

    async fn config_value(&self, key: &str) -> Result<String> {
        self.git(&["config", "--get", key]).await
    }
}

async fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let command = format!("git {}", args.join(" "));
    debug!("{}", command);

    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .await?;

    if !output.status.success() {
        return Err(Error::CommandFailed {
            command,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl GitOps for GitClient {
    async fn list_local_branches(&self) -> Result<Vec<String>> {
        let output = self
            .git(&["for-each-ref", "--format=%(refname:short)", "refs/heads/"])
            .await?;
        Ok(lines(&output))
    }

    async fn current_branch(&self) -> Result<String> {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn branches_containing(&self, commitish: &str) -> Result<Vec<String>> {
        // for-each-ref rather than `git branch --contains`, which also lists a
        // detached HEAD while a rebase is stopped
        let output = self
            .git(&[
                "for-each-ref",
                "--format=%(refname:short)",
                "--contains",
                commitish,
                "refs/heads/",
            ])
            .await?;
        Ok(lines(&output))
    }

    async fn resolve_commit(&self, reference: &str) -> Result<String> {
        self.git(&["rev-parse", "--verify", reference]).await
    }

    async fn upstream_of(&self, branch: &str) -> Result<String> {
        self.git(&[
            "rev-parse",
            "--symbolic-full-name",
            "--abbrev-ref=strict",
            &format!("{branch}@{{u}}"),
        ])
        .await
    }

    async fn checkout(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", branch]).await?;
        Ok(())
    }

    async fn rebase(&self, onto: &str) -> Result<RebaseOutcome> {
        match self.git(&["rebase", onto]).await {
            Ok(_) => Ok(RebaseOutcome::Success),
            Err(Error::CommandFailed { message, .. }) => Ok(RebaseOutcome::Failed(message)),
            Err(err) => Err(err),
        }
    }

    async fn rebase_in_progress(&self) -> Result<bool> {
        for dir in ["rebase-merge", "rebase-apply"] {
            if tokio::fs::try_exists(self.git_dir.join(dir)).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn abort_rebase(&self) -> Result<()> {
        self.git(&["rebase", "--abort"]).await?;
        Ok(())
    }

    async fn push_force_with_lease(&self, branch: &str) -> Result<()> {
        let remote = self.config_value(&format!("branch.{branch}.remote")).await?;
        let merge = self.config_value(&format!("branch.{branch}.merge")).await?;
        let refspec = format!("refs/heads/{branch}:{merge}");
        self.git(&["push", "--force-with-lease", &remote, &refspec])
            .await?;
        Ok(())
    }

    async fn reset_hard(&self, reference: &str) -> Result<()> {
        self.git(&["reset", "--hard", reference]).await?;
        Ok(())
    }

    async fn is_synchronized_with_upstream(&self, branch: &str) -> Result<bool> {
        let local = self.resolve_commit(branch).await?;
        let upstream = match self.resolve_commit(&format!("{branch}@{{u}}")).await {
            Ok(upstream) => upstream,
            Err(Error::CommandFailed { .. }) => return Ok(false),
            Err(err) => return Err(err),
        };
        Ok(local == upstream)
    }
}
