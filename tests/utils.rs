use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;

use gittrain::ops::prompt::PromptOps;
use tokio::process::Command;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer as _;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Runs git in `dir` and returns its trimmed stdout.
pub async fn git(dir: &Path, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_EDITOR", "true")
        .output()
        .await?;
    anyhow::ensure!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr).trim()
    );
    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

/// Creates a git repository in `dir` with an initial commit on `master`.
///
/// Sets the config needed for commits. The directory should already exist.
pub async fn create_git_repo(dir: &Path) -> anyhow::Result<()> {
    git(dir, &["init", "--quiet", "-b", "master"]).await?;
    git(dir, &["config", "user.name", "Test User"]).await?;
    git(dir, &["config", "user.email", "test@example.com"]).await?;
    git(dir, &["config", "commit.gpgsign", "false"]).await?;
    commit_file(dir, "README", "train\n", "Initial commit").await?;
    Ok(())
}

/// Creates a bare repository at `remote` and adds it as `origin` of `dir`.
pub async fn setup_git_remote(dir: &Path, remote: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(remote)?;
    git(remote, &["init", "--quiet", "--bare", "-b", "master"]).await?;
    let url = remote.to_string_lossy();
    git(dir, &["remote", "add", "origin", &url]).await?;
    Ok(())
}

/// Writes `contents` to `file` and commits it on the current branch.
pub async fn commit_file(
    dir: &Path,
    file: &str,
    contents: &str,
    message: &str,
) -> anyhow::Result<()> {
    std::fs::write(dir.join(file), contents)?;
    git(dir, &["add", file]).await?;
    git(dir, &["commit", "--quiet", "-m", message]).await?;
    Ok(())
}

/// Creates `branch` at the current HEAD with one commit and pushes it with upstream.
pub async fn create_pushed_branch(dir: &Path, branch: &str) -> anyhow::Result<()> {
    git(dir, &["checkout", "--quiet", "-b", branch]).await?;
    commit_file(dir, branch, &format!("{branch}\n"), branch).await?;
    git(dir, &["push", "--quiet", "-u", "origin", branch]).await?;
    Ok(())
}

pub async fn rev_parse(dir: &Path, reference: &str) -> anyhow::Result<String> {
    git(dir, &["rev-parse", reference]).await
}

pub async fn is_ancestor(dir: &Path, ancestor: &str, descendant: &str) -> anyhow::Result<bool> {
    let status = Command::new("git")
        .args(["merge-base", "--is-ancestor", ancestor, descendant])
        .current_dir(dir)
        .status()
        .await?;
    Ok(status.success())
}

pub fn setup_logging() -> anyhow::Result<()> {
    let timer = tracing_subscriber::fmt::time::ChronoLocal::new("%H:%M:%S%.3f".into());
    let format = tracing_subscriber::fmt::format().with_timer(timer);
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    let subscriber = tracing_subscriber::fmt::layer()
        .event_format(format)
        .with_test_writer()
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_filter(filter);
    tracing_subscriber::registry().with(subscriber).init();
    Ok(())
}

/// Answers prompts from a fixed script, then accepts everything.
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<bool>>,
    pub questions: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            questions: RefCell::new(Vec::new()),
        }
    }

    pub fn always_yes() -> Self {
        Self::new(&[])
    }
}

impl PromptOps for ScriptedPrompt {
    fn confirm(&self, question: &str, _default: bool) -> anyhow::Result<bool> {
        self.questions.borrow_mut().push(question.to_string());
        Ok(self.answers.borrow_mut().pop_front().unwrap_or(true))
    }
}

pub enum TestDir {
    Temp(tempfile::TempDir),
    Kept(PathBuf),
}

impl TestDir {
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;

        if std::env::var("DEBUG_TESTS").is_ok() {
            let path = temp_dir.keep();
            eprintln!("Test directory kept at: {}", path.display());
            Ok(TestDir::Kept(path))
        } else {
            Ok(TestDir::Temp(temp_dir))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            TestDir::Temp(t) => t.path(),
            TestDir::Kept(p) => p.as_path(),
        }
    }
}
