use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use launchpad::card::router::ConsoleRouter;
use launchpad::card::{TaskCard, TaskCardView};
use launchpad::config::{AppConfig, DirectorySource};
use launchpad::launch::{LaunchOutcome, LaunchState};
use launchpad::platform::backend::BackendClient;
use launchpad::platform::github::GitHubDirectory;
use launchpad::platform::types::GitProvider;
use launchpad::platform::{RepositoryDirectory, SuggestedTaskSource};
use launchpad::shutdown::wait_for_shutdown;
use launchpad::task::{self, TaskDescriptor, TaskType};

#[derive(Parser)]
#[command(name = "launchpad", about = "Launch conversations from suggested tasks")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List suggested tasks
    Tasks,
    /// Launch a conversation for one task
    Launch(LaunchArgs),
}

#[derive(Args)]
struct LaunchArgs {
    /// Position of the task in the `tasks` listing
    #[arg(long, conflicts_with_all = ["task_file", "repo"])]
    index: Option<usize>,

    /// JSON or TOML file holding the task
    #[arg(long, conflicts_with = "repo")]
    task_file: Option<PathBuf>,

    /// Repository full name, e.g. owner/name
    #[arg(long, requires_all = ["issue", "title", "task_type", "provider"])]
    repo: Option<String>,

    #[arg(long)]
    issue: Option<u64>,

    #[arg(long)]
    title: Option<String>,

    /// e.g. MERGE_CONFLICTS
    #[arg(long)]
    task_type: Option<TaskType>,

    /// github, gitlab or bitbucket
    #[arg(long)]
    provider: Option<GitProvider>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    tracing::debug!(config = ?config, "Loaded configuration");

    let backend = Arc::new(BackendClient::new(&config.backend)?);

    match cli.command {
        Command::Tasks => list_tasks(&backend).await,
        Command::Launch(args) => {
            let task = select_task(&backend, args).await?;
            launch(&config, backend, task).await
        }
    }
}

async fn list_tasks(backend: &BackendClient) -> anyhow::Result<()> {
    let tasks = backend
        .suggested_tasks()
        .await
        .context("Failed to fetch suggested tasks")?;

    if tasks.is_empty() {
        tracing::info!("No suggested tasks");
        return Ok(());
    }

    for (index, task) in tasks.iter().enumerate() {
        println!("{index:>3}  {}", TaskCardView::new(task, &LaunchState::Idle));
    }

    Ok(())
}

async fn select_task(backend: &BackendClient, args: LaunchArgs) -> anyhow::Result<TaskDescriptor> {
    if let Some(index) = args.index {
        let tasks = backend
            .suggested_tasks()
            .await
            .context("Failed to fetch suggested tasks")?;
        let count = tasks.len();
        return tasks
            .into_iter()
            .nth(index)
            .with_context(|| format!("No suggested task at index {index} ({count} available)"));
    }

    if let Some(path) = args.task_file {
        return Ok(task::load_from_file(&path)?);
    }

    match (args.repo, args.issue, args.title, args.task_type, args.provider) {
        (Some(repo_full_name), Some(issue_number), Some(title), Some(task_type), Some(git_provider)) => {
            Ok(TaskDescriptor {
                git_provider,
                issue_number,
                repo_full_name,
                task_type,
                title,
            })
        }
        _ => bail!("Specify a task with --index, --task-file, or --repo/--issue/--title/--task-type/--provider"),
    }
}

async fn launch(
    config: &AppConfig,
    backend: Arc<BackendClient>,
    task: TaskDescriptor,
) -> anyhow::Result<()> {
    let directory: Arc<dyn RepositoryDirectory> = match config.directory.source {
        DirectorySource::Backend => backend.clone(),
        DirectorySource::Github => Arc::new(GitHubDirectory::new(config.github()?)?),
    };
    let router = Arc::new(ConsoleRouter::new(backend.base_url()));

    let card = TaskCard::new(task, directory, backend, router);
    tracing::info!(card = %card.render(), "Launching task");

    let Some(handle) = card.click_launch() else {
        bail!("Launch control is disabled");
    };

    tokio::select! {
        joined = handle => {
            match joined.context("Launch task panicked")? {
                LaunchOutcome::Succeeded { conversation_id } => {
                    tracing::info!(conversation = %conversation_id, "Launch complete");
                    Ok(())
                }
                LaunchOutcome::Failed(error) => {
                    tracing::error!(card = %card.render(), "Launch failed");
                    Err(error.into())
                }
                outcome @ (LaunchOutcome::Ignored | LaunchOutcome::Discarded) => {
                    bail!("Launch did not complete: {outcome:?}")
                }
            }
        }
        _ = wait_for_shutdown() => {
            drop(card);
            tracing::warn!("Launch abandoned before the conversation was opened");
            Ok(())
        }
    }
}
