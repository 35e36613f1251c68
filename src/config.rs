use std::path::Path;

use anyhow::Result;
use anyhow::bail;

use crate::store::DEFAULT_STATUS_FILE;
use crate::workflow::WorkflowOptions;

const STATUS_FILE_KEY: &str = "gittrain.statusFile";
const CONFIRM_PUSH_KEY: &str = "gittrain.confirmPush";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name of the snapshot file inside the git directory.
    pub status_file: String,
    /// Ask before pushing the rebased train.
    pub confirm_push: bool,
}

impl Config {
    /// Load config from the repository's git config, falling back to defaults
    pub fn load(repo: &Path) -> Result<Self> {
        let defaults = Self::default();

        let status_file = match read_key(repo, STATUS_FILE_KEY, false)? {
            Some(name) => name,
            None => defaults.status_file,
        };
        if status_file.is_empty()
            || status_file.contains(['/', '\\'])
            || status_file == "."
            || status_file == ".."
        {
            bail!("{STATUS_FILE_KEY} must be a plain file name, got \"{status_file}\"");
        }

        let confirm_push = match read_key(repo, CONFIRM_PUSH_KEY, true)?.as_deref() {
            Some("true") => true,
            Some("false") => false,
            Some(other) => bail!("{CONFIRM_PUSH_KEY} must be a boolean, got \"{other}\""),
            None => defaults.confirm_push,
        };

        Ok(Self {
            status_file,
            confirm_push,
        })
    }

    /// Create a new config with explicit values (useful for tests)
    pub fn new(status_file: impl Into<String>, confirm_push: bool) -> Self {
        Self {
            status_file: status_file.into(),
            confirm_push,
        }
    }

    pub fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            confirm_push: self.confirm_push,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            status_file: DEFAULT_STATUS_FILE.to_string(),
            confirm_push: true,
        }
    }
}

/// Read a single git config value. `None` when the key is not set.
fn read_key(repo: &Path, key: &str, boolean: bool) -> Result<Option<String>> {
    let mut command = std::process::Command::new("git");
    command.current_dir(repo).arg("config");
    if boolean {
        command.arg("--type=bool");
    }
    let output = command.args(["--get", key]).output()?;

    // Exit code 1 means the key is not set
    if output.status.code() == Some(1) {
        return Ok(None);
    }
    if !output.status.success() {
        bail!(
            "Failed to read {} from git config: {}",
            key,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(Some(String::from_utf8(output.stdout)?.trim().to_string()))
}
