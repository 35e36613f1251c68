use tracing::info;
use tracing::instrument;

use crate::error::Result;
use crate::ops::git::GitOps;
use crate::store::StatusStore;

/// A branch moved back to its upstream by [`abort`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchReset {
    pub branch: String,
    pub from: String,
    pub to: String,
}

/// Discard the train in progress.
///
/// Every branch of the snapshot is hard reset to its upstream, whatever its
/// status. A rebase left stopped in the working copy is aborted first. The
/// snapshot is removed only once every branch has been reset.
#[instrument(skip_all)]
pub async fn abort(git: &impl GitOps, store: &StatusStore) -> Result<Vec<BranchReset>> {
    let train = store.read().await?;

    if git.rebase_in_progress().await? {
        info!("aborting stopped rebase");
        git.abort_rebase().await?;
    }

    let mut resets = Vec::with_capacity(train.branches().len());
    for branch in train.branches() {
        let upstream = format!("{}@{{u}}", branch.name);
        git.checkout(&branch.name).await?;
        let from = git.resolve_commit(&branch.name).await?;
        let to = git.resolve_commit(&upstream).await?;
        git.reset_hard(&upstream).await?;
        info!(branch = %branch.name, %from, %to, "reset to upstream");
        resets.push(BranchReset {
            branch: branch.name.clone(),
            from,
            to,
        });
    }

    store.remove().await?;
    Ok(resets)
}
