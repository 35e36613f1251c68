//! Collaborators the train machinery drives.
//!
//! - [`git`]: version control operations on the working copy (branch queries,
//!   checkout, rebase, push, reset)
//! - [`prompt`]: yes/no confirmation from the operator
//!
//! Each submodule provides a trait with a real implementation and, under test,
//! a `mockall` mock.

pub mod git;
pub mod prompt;
