//! In-memory stand-in for a git working copy.
//!
//! Histories are lists of commit ids, oldest first. A branch contains a commit
//! when the id appears in its history; commit ids survive a rebase unchanged.

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;

use crate::error::Error;
use crate::error::Result;
use crate::ops::git::GitOps;
use crate::ops::git::RebaseOutcome;

pub struct FakeGit {
    branches: RefCell<Vec<(String, Vec<String>)>>,
    upstreams: RefCell<HashMap<String, Vec<String>>>,
    head: RefCell<String>,
    conflicts: RefCell<HashSet<String>>,
    rebase_stopped: Cell<bool>,
    calls: RefCell<Vec<String>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self {
            branches: RefCell::new(Vec::new()),
            upstreams: RefCell::new(HashMap::new()),
            head: RefCell::new("master".to_string()),
            conflicts: RefCell::new(HashSet::new()),
            rebase_stopped: Cell::new(false),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// A linear chain: `root` with `root_commits`, then one commit per branch.
    pub fn chain(root: &str, root_commits: &[&str], branches: &[&str]) -> Self {
        let git = Self::new().with_branch(root, root_commits);
        let mut history: Vec<String> = root_commits.iter().map(|c| c.to_string()).collect();
        for name in branches {
            history.push(format!("{name}-1"));
            git.branches
                .borrow_mut()
                .push((name.to_string(), history.clone()));
        }
        git.with_synced_upstreams()
    }

    pub fn with_branch(self, name: &str, history: &[&str]) -> Self {
        self.branches.borrow_mut().push((
            name.to_string(),
            history.iter().map(|c| c.to_string()).collect(),
        ));
        self
    }

    pub fn with_synced_upstream(self, name: &str) -> Self {
        let history = self.history(name).unwrap_or_default();
        self.upstreams.borrow_mut().insert(name.to_string(), history);
        self
    }

    pub fn with_synced_upstreams(self) -> Self {
        let names: Vec<String> = self.branch_names();
        names
            .iter()
            .fold(self, |git, name| git.with_synced_upstream(name))
    }

    /// Commit on top of a branch without pushing it.
    pub fn with_local_commit(self, name: &str, commit: &str) -> Self {
        self.add_commit(name, commit);
        self
    }

    /// Make the rebase of `branch` stop with a conflict.
    pub fn with_conflict(self, branch: &str) -> Self {
        self.conflicts.borrow_mut().insert(branch.to_string());
        self
    }

    pub fn with_head(self, branch: &str) -> Self {
        *self.head.borrow_mut() = branch.to_string();
        self
    }

    pub fn add_commit(&self, name: &str, commit: &str) {
        let mut branches = self.branches.borrow_mut();
        if let Some((_, history)) = branches.iter_mut().find(|(n, _)| n == name) {
            history.push(commit.to_string());
        }
    }

    /// Move the remote side of `name` on without touching the local branch.
    pub fn add_upstream_commit(&self, name: &str, commit: &str) {
        let mut upstreams = self.upstreams.borrow_mut();
        if let Some(history) = upstreams.get_mut(name) {
            history.push(commit.to_string());
        }
    }

    /// Finish a stopped rebase by hand, as the operator would.
    pub fn resolve_conflict(&self, branch: &str) {
        self.conflicts.borrow_mut().remove(branch);
        self.rebase_stopped.set(false);
    }

    /// Mutating operations in the order they ran.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn history(&self, name: &str) -> Option<Vec<String>> {
        self.branches
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, history)| history.clone())
    }

    pub fn upstream(&self, name: &str) -> Option<Vec<String>> {
        self.upstreams.borrow().get(name).cloned()
    }

    pub fn head(&self) -> String {
        self.head.borrow().clone()
    }

    fn branch_names(&self) -> Vec<String> {
        self.branches
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn failed(command: &str, message: &str) -> Error {
        Error::CommandFailed {
            command: command.to_string(),
            message: message.to_string(),
        }
    }

    /// History a reference points at: `name@{u}`, `origin/name`, a branch,
    /// or a known commit.
    fn resolve_history(&self, reference: &str) -> Result<Vec<String>> {
        if let Some(name) = reference
            .strip_suffix("@{u}")
            .or_else(|| reference.strip_prefix("origin/"))
        {
            return self
                .upstream(name)
                .ok_or_else(|| Self::failed("rev-parse", "no upstream configured"));
        }
        if let Some(history) = self.history(reference) {
            return Ok(history);
        }
        for (_, history) in self.branches.borrow().iter() {
            if let Some(position) = history.iter().position(|c| c == reference) {
                return Ok(history[..=position].to_vec());
            }
        }
        Err(Self::failed("rev-parse", "unknown revision"))
    }

    fn set_history(&self, name: &str, history: Vec<String>) {
        let mut branches = self.branches.borrow_mut();
        if let Some((_, current)) = branches.iter_mut().find(|(n, _)| n == name) {
            *current = history;
        }
    }
}

fn tip(history: &[String]) -> String {
    history.last().cloned().unwrap_or_default()
}

impl GitOps for FakeGit {
    async fn list_local_branches(&self) -> Result<Vec<String>> {
        Ok(self.branch_names())
    }

    async fn current_branch(&self) -> Result<String> {
        Ok(self.head())
    }

    async fn branches_containing(&self, commitish: &str) -> Result<Vec<String>> {
        let commit = tip(&self.resolve_history(commitish)?);
        Ok(self
            .branches
            .borrow()
            .iter()
            .filter(|(_, history)| history.contains(&commit))
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn resolve_commit(&self, reference: &str) -> Result<String> {
        Ok(tip(&self.resolve_history(reference)?))
    }

    async fn upstream_of(&self, branch: &str) -> Result<String> {
        match self.upstream(branch) {
            Some(_) => Ok(format!("origin/{branch}")),
            None => Err(Self::failed("rev-parse", "no upstream configured")),
        }
    }

    async fn checkout(&self, branch: &str) -> Result<()> {
        if self.rebase_stopped.get() {
            return Err(Self::failed("checkout", "a rebase is in progress"));
        }
        if self.history(branch).is_none() {
            return Err(Self::failed("checkout", "no such branch"));
        }
        self.record(format!("checkout {branch}"));
        *self.head.borrow_mut() = branch.to_string();
        Ok(())
    }

    async fn rebase(&self, onto: &str) -> Result<RebaseOutcome> {
        let head = self.head();
        self.record(format!("rebase {head} onto {onto}"));
        if self.conflicts.borrow().contains(&head) {
            self.rebase_stopped.set(true);
            return Ok(RebaseOutcome::Failed(format!(
                "CONFLICT (content): Merge conflict in {head}.txt"
            )));
        }
        let base = self.resolve_history(onto)?;
        let own: Vec<String> = self
            .history(&head)
            .unwrap_or_default()
            .into_iter()
            .filter(|commit| !base.contains(commit))
            .collect();
        self.set_history(&head, base.into_iter().chain(own).collect());
        Ok(RebaseOutcome::Success)
    }

    async fn rebase_in_progress(&self) -> Result<bool> {
        Ok(self.rebase_stopped.get())
    }

    async fn abort_rebase(&self) -> Result<()> {
        self.record("rebase --abort".to_string());
        self.rebase_stopped.set(false);
        Ok(())
    }

    async fn push_force_with_lease(&self, branch: &str) -> Result<()> {
        if self.upstream(branch).is_none() {
            return Err(Self::failed("push", "no upstream configured"));
        }
        self.record(format!("push {branch}"));
        let history = self.history(branch).unwrap_or_default();
        self.upstreams.borrow_mut().insert(branch.to_string(), history);
        Ok(())
    }

    async fn reset_hard(&self, reference: &str) -> Result<()> {
        let history = self.resolve_history(reference)?;
        let head = self.head();
        self.record(format!("reset {head} to {reference}"));
        self.set_history(&head, history);
        Ok(())
    }

    async fn is_synchronized_with_upstream(&self, branch: &str) -> Result<bool> {
        let local = self.history(branch).map(|history| tip(&history));
        let upstream = self.upstream(branch).map(|history| tip(&history));
        Ok(upstream.is_some() && local == upstream)
    }
}
