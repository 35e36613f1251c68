//! Discovery of the branch train.
//!
//! Git records no parent/child relation between branches, so the chain order is
//! recovered from reachability alone. In a linear chain `root -> b0 -> ... -> bn`
//! the tip of `bi` is contained by itself and every branch stacked on it, which
//! gives each branch a distinct weight `n + 1 - i`. Sorting by weight descending
//! yields the chain from root to tip. Equal weights only happen when branches
//! fork, and are reported instead of guessed.

use std::collections::HashMap;

use tracing::debug;
use tracing::instrument;

use crate::error::Error;
use crate::error::Result;
use crate::error::TopologyError;
use crate::model::Branch;
use crate::model::Train;
use crate::ops::git::GitOps;

/// Candidates in chain order, plus every group of equally weighted branches.
#[derive(Debug, PartialEq, Eq)]
pub struct ChainOrder {
    pub branches: Vec<String>,
    pub ties: Vec<Vec<String>>,
}

/// Order `candidates` by descending weight.
///
/// The sort is stable, so tied branches keep their discovery order.
pub fn order_by_weight(mut candidates: Vec<String>, weights: &HashMap<String, usize>) -> ChainOrder {
    let weight = |name: &String| weights.get(name).copied().unwrap_or(0);
    candidates.sort_by(|a, b| weight(b).cmp(&weight(a)));

    let ties = candidates
        .chunk_by(|a, b| weight(a) == weight(b))
        .filter(|group| group.len() > 1)
        .map(|group| group.to_vec())
        .collect();

    ChainOrder {
        branches: candidates,
        ties,
    }
}

/// Builds a [`Train`] from the live repository.
pub struct ChainResolver<'a, G: GitOps> {
    git: &'a G,
}

impl<'a, G: GitOps> ChainResolver<'a, G> {
    pub fn new(git: &'a G) -> Self {
        Self { git }
    }

    /// Resolve the train starting at `start` to be rebased onto `root`.
    ///
    /// Fails with a [`TopologyError`] before touching the working copy when the
    /// branches fork or any of them differs from its upstream.
    #[instrument(skip(self))]
    pub async fn resolve(&self, start: &str, root: &str) -> Result<Train> {
        let local = self.git.list_local_branches().await?;
        if !local.iter().any(|branch| branch == start) {
            return Err(TopologyError::MissingBranch {
                name: start.to_string(),
            }
            .into());
        }
        // Any revision git can resolve works as a target, e.g. `origin/master`
        let rebase_root = match Branch::discover(self.git, root).await {
            Ok(branch) => branch,
            Err(Error::CommandFailed { .. }) => {
                return Err(TopologyError::MissingBranch {
                    name: root.to_string(),
                }
                .into());
            }
            Err(err) => return Err(err),
        };

        let candidates = self.git.branches_containing(start).await?;
        if candidates.iter().any(|branch| branch == root) {
            return Err(TopologyError::RootInChain {
                root: root.to_string(),
            }
            .into());
        }

        let weights = self.weights(start, &candidates).await?;
        let order = order_by_weight(candidates, &weights);
        if let Some(tied) = order.ties.into_iter().next() {
            return Err(TopologyError::Fork { branches: tied }.into());
        }
        debug!(order = ?order.branches, "resolved chain order");

        for name in &order.branches {
            if !self.git.is_synchronized_with_upstream(name).await? {
                return Err(TopologyError::Unsynchronized {
                    branch: name.clone(),
                }
                .into());
            }
        }

        let mut branches = Vec::with_capacity(order.branches.len());
        for name in &order.branches {
            branches.push(Branch::discover(self.git, name).await?);
        }
        Train::new(rebase_root, branches)
    }

    /// Weight of every candidate, one containment query per branch.
    ///
    /// The start branch's containing set is the candidate set itself, so its
    /// weight needs no further query.
    async fn weights(&self, start: &str, candidates: &[String]) -> Result<HashMap<String, usize>> {
        let mut weights = HashMap::with_capacity(candidates.len());
        weights.insert(start.to_string(), candidates.len());
        for name in candidates {
            if weights.contains_key(name) {
                continue;
            }
            let containing = self.git.branches_containing(name).await?;
            weights.insert(name.clone(), containing.len());
        }
        Ok(weights)
    }
}
