use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::ops::git::GitOps;

/// Number of hash characters shown to the operator.
pub const SHORT_HASH_LENGTH: usize = 8;

/// The first [`SHORT_HASH_LENGTH`] characters of `hash`.
pub fn abbreviate_hash(hash: &str) -> &str {
    &hash[..SHORT_HASH_LENGTH.min(hash.len())]
}

/// Progress of a branch through a run, ordered `Found < Rebased < Reviewed < Pushed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Found,
    Rebased,
    Reviewed,
    Pushed,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Found => f.write_str("found"),
            Self::Rebased => f.write_str("rebased"),
            Self::Reviewed => f.write_str("reviewed"),
            Self::Pushed => f.write_str("pushed"),
        }
    }
}

/// A local branch taking part in a train.
///
/// `hash` is the tip at discovery time and is not kept in sync with the
/// working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub hash: String,
    status: Status,
}

impl Branch {
    pub fn new(name: impl Into<String>, hash: impl Into<String>, status: Status) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            status,
        }
    }

    /// Build a branch from the live repository, at status [`Status::Found`].
    pub async fn discover(git: &impl GitOps, name: &str) -> Result<Self> {
        let hash = git.resolve_commit(name).await?;
        Ok(Self::new(name, hash, Status::Found))
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Move the branch forward to `status`. Moving backwards is rejected.
    pub fn promote(&mut self, status: Status) -> Result<()> {
        if status < self.status {
            return Err(Error::StatusRegression {
                branch: self.name.clone(),
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        Ok(())
    }

    pub fn short_hash(&self) -> &str {
        abbreviate_hash(&self.hash)
    }
}
