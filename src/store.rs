//! Persistence of the train in progress.
//!
//! The snapshot is one JSON document inside the repository's git directory.
//! Its existence means a run is in progress. It is rewritten in full after
//! every status change through a temporary file that is synced to disk and then
//! renamed over the snapshot, so a crash never leaves a half-written snapshot.
//! It is deleted when the run ends.

use std::path::Path;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt as _;
use tracing::debug;

use crate::error::Error;
use crate::error::Result;
use crate::model::Train;

pub const DEFAULT_STATUS_FILE: &str = "gittrain-status.json";

pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the snapshot as `file_name` inside `git_dir`.
    pub fn in_git_dir(git_dir: &Path, file_name: &str) -> Self {
        Self::new(git_dir.join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn is_in_progress(&self) -> Result<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    pub async fn read(&self) -> Result<Train> {
        if !self.is_in_progress().await? {
            return Err(Error::NoRunInProgress);
        }
        let contents = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&contents)?)
    }

    pub async fn write(&self, train: &Train) -> Result<()> {
        let contents = serde_json::to_vec_pretty(train)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&contents).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "wrote train snapshot");
        Ok(())
    }

    pub async fn remove(&self) -> Result<()> {
        tokio::fs::remove_file(&self.path).await?;
        debug!(path = %self.path.display(), "removed train snapshot");
        Ok(())
    }
}
