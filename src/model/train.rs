use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use super::branch::Branch;
use super::branch::Status;
use crate::error::Error;
use crate::error::Result;
use crate::error::TopologyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainStatus {
    Created,
}

/// The chain of branches rebased in one run.
///
/// `branches[0]` is rebased onto `rebase_root` and every later branch onto its
/// predecessor. Names are unique and the root never appears in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TrainSnapshot")]
pub struct Train {
    rebase_root: Branch,
    status: TrainStatus,
    branches: Vec<Branch>,
}

/// Unvalidated persisted shape of a [`Train`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainSnapshot {
    rebase_root: Branch,
    status: TrainStatus,
    branches: Vec<Branch>,
}

impl TryFrom<TrainSnapshot> for Train {
    type Error = Error;

    fn try_from(snapshot: TrainSnapshot) -> Result<Self> {
        let mut train = Self::new(snapshot.rebase_root, snapshot.branches)?;
        train.status = snapshot.status;
        Ok(train)
    }
}

impl Train {
    pub fn new(rebase_root: Branch, branches: Vec<Branch>) -> Result<Self> {
        let mut seen = HashSet::new();
        for branch in &branches {
            if branch.name == rebase_root.name {
                return Err(TopologyError::RootInChain {
                    root: rebase_root.name.clone(),
                }
                .into());
            }
            if !seen.insert(branch.name.as_str()) {
                return Err(Error::Duplicate(branch.name.clone()));
            }
        }

        Ok(Self {
            rebase_root,
            status: TrainStatus::Created,
            branches,
        })
    }

    pub fn rebase_root(&self) -> &Branch {
        &self.rebase_root
    }

    pub fn status(&self) -> TrainStatus {
        self.status
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn are_all_rebased(&self) -> bool {
        self.all_at_least(Status::Rebased)
    }

    pub fn are_all_reviewed(&self) -> bool {
        self.all_at_least(Status::Reviewed)
    }

    pub fn are_all_pushed(&self) -> bool {
        self.all_at_least(Status::Pushed)
    }

    fn all_at_least(&self, threshold: Status) -> bool {
        self.branches.iter().all(|branch| branch.status() >= threshold)
    }

    pub fn next_unrebased(&self) -> Result<&Branch> {
        self.next_of_status(Status::Found)
    }

    pub fn next_unreviewed(&self) -> Result<&Branch> {
        self.next_of_status(Status::Rebased)
    }

    pub fn next_unpushed(&self) -> Result<&Branch> {
        self.next_of_status(Status::Reviewed)
    }

    fn next_of_status(&self, status: Status) -> Result<&Branch> {
        self.branches
            .iter()
            .find(|branch| branch.status() == status)
            .ok_or_else(|| Error::NotFound(format!("No branches of status \"{status}\" found")))
    }

    /// The last branch in chain order exactly at `status`.
    pub fn last_of_status(&self, status: Status) -> Result<&Branch> {
        self.branches
            .iter()
            .rev()
            .find(|branch| branch.status() == status)
            .ok_or_else(|| Error::NotFound(format!("No branches of status \"{status}\" found")))
    }

    /// The chain successor of `current`; the first branch when `current` is the root.
    pub fn next(&self, current: &Branch) -> Result<&Branch> {
        if current.name == self.rebase_root.name {
            return self
                .branches
                .first()
                .ok_or_else(|| Error::EndOfChain(current.name.clone()));
        }
        let position = self.position(&current.name)?;
        self.branches
            .get(position + 1)
            .ok_or_else(|| Error::EndOfChain(current.name.clone()))
    }

    pub fn branch_by_name(&self, name: &str) -> Result<&Branch> {
        Ok(&self.branches[self.position(name)?])
    }

    /// Promote the named branch, see [`Branch::promote`].
    pub fn promote(&mut self, name: &str, status: Status) -> Result<()> {
        let position = self.position(name)?;
        self.branches[position].promote(status)
    }

    fn position(&self, name: &str) -> Result<usize> {
        let mut matches = self
            .branches
            .iter()
            .enumerate()
            .filter(|(_, branch)| branch.name == name)
            .map(|(i, _)| i);
        let Some(first) = matches.next() else {
            return Err(Error::NotFound(format!("Branch \"{name}\" not found")));
        };
        if matches.next().is_some() {
            return Err(Error::Duplicate(name.to_string()));
        }
        Ok(first)
    }
}
