use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use gittrain::App;
use gittrain::Config;
use gittrain::ops::git::GitClient;
use gittrain::ops::prompt::TerminalPrompt;
use gittrain::store::StatusStore;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "gittrain")]
#[command(about = "Rebase a train of dependent git branches, review and push them", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebase the train starting at FIRST_BRANCH onto REBASE_TARGET
    Rebase {
        /// First branch of the train
        #[arg(required_unless_present_any = ["resume", "abort"], conflicts_with_all = ["resume", "abort"])]
        first_branch: Option<String>,
        /// Branch the train is rebased onto
        #[arg(required_unless_present_any = ["resume", "abort"], conflicts_with_all = ["resume", "abort"])]
        rebase_target: Option<String>,
        /// Continue the train rebase in progress
        #[arg(long = "continue", conflicts_with = "abort")]
        resume: bool,
        /// Abort the train rebase in progress and reset branches to upstream
        #[arg(long)]
        abort: bool,
    },
    /// Show the train rebase in progress
    Status,
}

fn setup_logging() -> Result<()> {
    let timer = tracing_subscriber::fmt::time::ChronoLocal::new("%H:%M:%S%.3f".into());
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env()?;
    tracing_subscriber::fmt()
        .with_timer(timer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let git = GitClient::discover(&cwd)
        .await
        .context("Not inside a git repository")?;
    let config = Config::load(git.path())?;
    let store = StatusStore::in_git_dir(git.git_dir(), &config.status_file);
    let app = App::new(config, git, TerminalPrompt, store);

    let mut stdout = std::io::stdout();
    match cli.command {
        Some(Commands::Rebase { abort: true, .. }) => app.cmd_abort(&mut stdout).await?,
        Some(Commands::Rebase { resume: true, .. }) => app.cmd_continue(&mut stdout).await?,
        Some(Commands::Rebase {
            first_branch: Some(first_branch),
            rebase_target: Some(rebase_target),
            ..
        }) => {
            app.cmd_rebase(&first_branch, &rebase_target, &mut stdout)
                .await?
        }
        Some(Commands::Rebase { .. }) => {
            anyhow::bail!("Both FIRST_BRANCH and REBASE_TARGET are required")
        }
        Some(Commands::Status) | None => app.cmd_status(&mut stdout).await?,
    }

    Ok(())
}
