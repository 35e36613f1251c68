use std::io;

use thiserror::Error;

use crate::model::Status;

/// Result type for the train machinery.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving, running or persisting a train.
#[derive(Debug, Error)]
pub enum Error {
    /// The discovered branches cannot be rebased as a single train.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// `git rebase` stopped on a branch. The operator resolves it and resumes.
    #[error(
        "Failed to rebase \"{branch}\" onto \"{onto}\" with message \"{message}\". Rebase manually and continue with --continue"
    )]
    RebaseFailed {
        branch: String,
        onto: String,
        message: String,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("There should be exactly one branch \"{0}\"")]
    Duplicate(String),

    #[error("No next branch, \"{0}\" is the last branch")]
    EndOfChain(String),

    #[error("Branch \"{branch}\" cannot move back from {from} to {to}")]
    StatusRegression {
        branch: String,
        from: Status,
        to: Status,
    },

    /// A git invocation exited unsuccessfully.
    #[error("`{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("There is already a train rebase in progress, use --continue or --abort")]
    RunInProgress,

    #[error("There is no train rebase in progress")]
    NoRunInProgress,

    #[error("Review of \"{branch}\" was not acknowledged. Continue with --continue when ready")]
    ReviewDeclined { branch: String },

    #[error("No prompt is waiting for an answer")]
    NoPendingPrompt,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons a set of branches does not form a rebasable linear train.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Your branch \"{branch}\" is not pushed or does not have upstream set, refusing to continue")]
    Unsynchronized { branch: String },

    /// Branches with equal weight sit on different forks and have no chain order.
    #[error("Branches {} fork from a common ancestor, cannot order them into a train", .branches.join(", "))]
    Fork { branches: Vec<String> },

    #[error("Rebase target \"{root}\" already contains the first branch")]
    RootInChain { root: String },

    #[error("Branch \"{name}\" does not exist")]
    MissingBranch { name: String },
}
