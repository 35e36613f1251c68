use std::fmt::Display;

/// Which of the two review steps an artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewKind {
    /// Compare the branch's commits before and after the rebase.
    RangeDiff,
    /// Full diff between the pushed branch and the rebased one.
    Diff,
}

/// A command the operator runs to review one rebased branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewArtifact {
    pub kind: ReviewKind,
    pub branch: String,
    pub previous: String,
    pub upstream: String,
}

impl ReviewArtifact {
    pub fn range_diff(previous: &str, upstream: &str, branch: &str) -> Self {
        Self {
            kind: ReviewKind::RangeDiff,
            branch: branch.to_string(),
            previous: previous.to_string(),
            upstream: upstream.to_string(),
        }
    }

    /// The artifact shown after this one has been acknowledged.
    pub fn into_diff(self) -> Self {
        Self {
            kind: ReviewKind::Diff,
            ..self
        }
    }

    pub fn command(&self) -> String {
        match self.kind {
            ReviewKind::RangeDiff => format!(
                "git range-diff {} {} {}",
                shell_quote(&self.previous),
                shell_quote(&self.upstream),
                shell_quote(&self.branch)
            ),
            ReviewKind::Diff => format!(
                "git diff {}..{}",
                shell_quote(&self.upstream),
                shell_quote(&self.branch)
            ),
        }
    }
}

impl Display for ReviewArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Please review the diff from following command")?;
        writeln!(f)?;
        write!(f, "    {}", self.command())
    }
}

/// A point where the run waits for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Review(ReviewArtifact),
    Push,
}

impl Prompt {
    pub fn question(&self) -> &'static str {
        match self {
            Self::Review(_) => "Reviewed, continue?",
            Self::Push => "Would you like to push the changes?",
        }
    }

    pub fn default_answer(&self) -> bool {
        match self {
            Self::Review(_) => true,
            Self::Push => false,
        }
    }
}

/// Single-quote `arg` for a POSIX shell.
fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}
