//! The rebase, review and push phases of a run.
//!
//! A [`Workflow`] owns the [`Train`] for the duration of a run and flushes it
//! to the [`StatusStore`] after every branch status change, so a run stopped at
//! any point resumes from the last flushed state. Phases always re-check the
//! train before acting, which makes each of them resumable on its own.
//!
//! The engine never talks to the terminal. Where the operator has to answer,
//! [`Workflow::advance`] returns [`Step::Confirm`] and the caller feeds the
//! answer back through [`Workflow::respond`].

mod abort;
mod review;

use std::io::Write;

use tracing::info;
use tracing::instrument;

pub use abort::BranchReset;
pub use abort::abort;
pub use review::Prompt;
pub use review::ReviewArtifact;
pub use review::ReviewKind;

use crate::error::Error;
use crate::error::Result;
use crate::model::Branch;
use crate::model::Status;
use crate::model::Train;
use crate::ops::git::GitOps;
use crate::ops::git::RebaseOutcome;
use crate::resolver::ChainResolver;
use crate::store::StatusStore;

#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    /// Ask before starting the push phase.
    pub confirm_push: bool,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self { confirm_push: true }
    }
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pushed,
    /// The operator declined the push; branches stay rebased locally.
    PushDeclined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Confirm(Prompt),
    Done(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Rebase,
    Review,
    PushConfirmation,
    Push,
    Done(Outcome),
}

pub struct Workflow<'a, G: GitOps> {
    git: &'a G,
    store: &'a StatusStore,
    train: Train,
    options: WorkflowOptions,
    stage: Stage,
    /// Last branch visited by the review phase; the root before the first.
    review_cursor: Branch,
    pending: Option<Prompt>,
}

impl<'a, G: GitOps> Workflow<'a, G> {
    pub fn new(git: &'a G, store: &'a StatusStore, train: Train, options: WorkflowOptions) -> Self {
        let review_cursor = train.rebase_root().clone();
        Self {
            git,
            store,
            train,
            options,
            stage: Stage::Rebase,
            review_cursor,
            pending: None,
        }
    }

    /// Start a fresh run. Refused while another run is in progress.
    pub async fn begin(
        git: &'a G,
        store: &'a StatusStore,
        start: &str,
        root: &str,
        options: WorkflowOptions,
    ) -> Result<Self> {
        if store.is_in_progress().await? {
            return Err(Error::RunInProgress);
        }
        let train = ChainResolver::new(git).resolve(start, root).await?;
        Ok(Self::new(git, store, train, options))
    }

    /// Pick up the run in progress from its snapshot.
    pub async fn resume(git: &'a G, store: &'a StatusStore, options: WorkflowOptions) -> Result<Self> {
        let train = store.read().await?;
        Ok(Self::new(git, store, train, options))
    }

    pub fn train(&self) -> &Train {
        &self.train
    }

    /// Run until the operator has to answer or the run ends.
    ///
    /// Calling it again while a prompt is pending returns the same prompt.
    pub async fn advance(&mut self, out: &mut impl Write) -> Result<Step> {
        loop {
            if let Some(prompt) = &self.pending {
                return Ok(Step::Confirm(prompt.clone()));
            }
            match self.stage {
                Stage::Rebase => {
                    self.rebase_phase(out).await?;
                    self.enter_review(out)?;
                }
                Stage::Review => match self.next_review(out).await? {
                    Some(artifact) => self.pending = Some(Prompt::Review(artifact)),
                    None => {
                        writeln!(out, "All rebased branches reviewed")?;
                        self.stage = self.after_review();
                    }
                },
                Stage::PushConfirmation => self.pending = Some(Prompt::Push),
                Stage::Push => {
                    self.push_phase(out).await?;
                    self.finish(Outcome::Pushed).await?;
                }
                Stage::Done(outcome) => return Ok(Step::Done(outcome)),
            }
        }
    }

    /// Answer the prompt returned by the last [`Workflow::advance`].
    ///
    /// Declining a review stops the run with [`Error::ReviewDeclined`], leaving
    /// the snapshot in place. Declining the push ends the run.
    pub async fn respond(&mut self, accepted: bool, out: &mut impl Write) -> Result<()> {
        let Some(prompt) = self.pending.take() else {
            return Err(Error::NoPendingPrompt);
        };

        match prompt {
            Prompt::Review(artifact) if !accepted => Err(Error::ReviewDeclined {
                branch: artifact.branch,
            }),
            Prompt::Review(artifact) => match artifact.kind {
                ReviewKind::RangeDiff => {
                    self.pending = Some(Prompt::Review(artifact.into_diff()));
                    Ok(())
                }
                ReviewKind::Diff => {
                    self.train.promote(&artifact.branch, Status::Reviewed)?;
                    self.persist().await?;
                    self.review_cursor = self.train.branch_by_name(&artifact.branch)?.clone();
                    Ok(())
                }
            },
            Prompt::Push if accepted => {
                self.stage = Stage::Push;
                Ok(())
            }
            Prompt::Push => {
                writeln!(out, "Push skipped, rebased branches were not pushed")?;
                self.finish(Outcome::PushDeclined).await
            }
        }
    }

    #[instrument(skip_all)]
    async fn rebase_phase(&mut self, out: &mut impl Write) -> Result<()> {
        if self.train.are_all_rebased() {
            writeln!(out, "All branches are already rebased, skipping")?;
            return Ok(());
        }
        writeln!(
            out,
            "Rebasing train of branches starting from \"{}\" on \"{}\"",
            self.train.next_unrebased()?.name,
            self.train.rebase_root().name
        )?;
        self.persist().await?;

        let mut previous = self.train.rebase_root().clone();
        while !self.train.are_all_rebased() {
            let current = self.train.next(&previous)?.clone();
            if current.status() >= Status::Rebased {
                writeln!(out, "Branch \"{}\" already rebased, skipping", current.name)?;
                previous = current;
                continue;
            }
            writeln!(out, "Rebasing \"{}\" on \"{}\"", current.name, previous.name)?;

            self.git.checkout(&current.name).await?;
            if let RebaseOutcome::Failed(message) = self.git.rebase(&previous.name).await? {
                return Err(Error::RebaseFailed {
                    branch: current.name,
                    onto: previous.name,
                    message,
                });
            }
            self.train.promote(&current.name, Status::Rebased)?;
            self.persist().await?;
            info!(branch = %current.name, onto = %previous.name, "rebased");

            previous = self.train.branch_by_name(&current.name)?.clone();
        }
        writeln!(out, "Rebase of branch train finished")?;
        Ok(())
    }

    fn enter_review(&mut self, out: &mut impl Write) -> Result<()> {
        self.review_cursor = self.train.rebase_root().clone();
        if self.train.are_all_reviewed() {
            writeln!(out, "All branches are already reviewed, skipping")?;
            self.stage = self.after_review();
        } else {
            writeln!(out, "Commencing review sequence")?;
            self.stage = Stage::Review;
        }
        Ok(())
    }

    /// The next branch awaiting review, as its first artifact.
    async fn next_review(&mut self, out: &mut impl Write) -> Result<Option<ReviewArtifact>> {
        while !self.train.are_all_reviewed() {
            let current = self.train.next(&self.review_cursor)?.clone();
            if current.status() >= Status::Reviewed {
                writeln!(out, "Branch \"{}\" already reviewed, skipping", current.name)?;
                self.review_cursor = current;
                continue;
            }
            let upstream = self.git.upstream_of(&current.name).await?;
            return Ok(Some(ReviewArtifact::range_diff(
                &self.review_cursor.name,
                &upstream,
                &current.name,
            )));
        }
        Ok(None)
    }

    fn after_review(&self) -> Stage {
        if self.options.confirm_push && !self.train.are_all_pushed() {
            Stage::PushConfirmation
        } else {
            Stage::Push
        }
    }

    #[instrument(skip_all)]
    async fn push_phase(&mut self, out: &mut impl Write) -> Result<()> {
        while !self.train.are_all_pushed() {
            let name = self.train.next_unpushed()?.name.clone();
            self.git.checkout(&name).await?;
            self.git.push_force_with_lease(&name).await?;
            writeln!(out, "Pushed \"{name}\"")?;
            self.train.promote(&name, Status::Pushed)?;
            self.persist().await?;
        }
        writeln!(out, "All branches pushed")?;
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        self.store.write(&self.train).await
    }

    async fn finish(&mut self, outcome: Outcome) -> Result<()> {
        self.store.remove().await?;
        self.stage = Stage::Done(outcome);
        Ok(())
    }
}
