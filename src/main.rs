//! branch-sync CLI

mod cli;

use branch_sync::actions::error_annotation;
use branch_sync::config::RawInputs;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Keep a feature or fork branch in sync with its upstream
///
/// Every option can also be supplied through the GitHub Actions input
/// environment (`INPUT_<NAME>`), so the binary runs unchanged as an action
/// step.
#[derive(Parser, Debug)]
#[command(name = "branch-sync", version, about)]
struct Cli {
    /// Upstream branch name or commit SHA to sync from
    #[arg(long, env = "INPUT_UPSTREAM-BRANCH")]
    upstream_branch: Option<String>,

    /// Branch to keep in sync
    #[arg(long, env = "INPUT_FEATURE-BRANCH")]
    feature_branch: Option<String>,

    /// Explicit upstream repository as owner/name (force-resets the feature branch)
    #[arg(long, env = "INPUT_UPSTREAM-REPO")]
    upstream_repo: Option<String>,

    /// Base branch for the sync PR
    #[arg(long, env = "INPUT_BASE-BRANCH")]
    base_branch: Option<String>,

    /// API token (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_REPO-TOKEN", hide_env_values = true)]
    repo_token: Option<String>,

    /// Repository holding the feature branch, as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Show what would be done without making changes
    #[arg(long, env = "INPUT_DRY-RUN")]
    dry_run: bool,
}

impl From<Cli> for RawInputs {
    fn from(cli: Cli) -> Self {
        Self {
            upstream_branch: cli.upstream_branch,
            feature_branch: cli.feature_branch,
            upstream_repo: cli.upstream_repo,
            base_branch: cli.base_branch,
            repo_token: cli
                .repo_token
                .filter(|token| !token.trim().is_empty())
                .or_else(|| std::env::var("GITHUB_TOKEN").ok()),
            repository: cli.repository,
            api_url: cli.api_url,
            dry_run: cli.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("BRANCH_SYNC_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();

    match cli::run_sync_command(args.into()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            anstream::println!(
                "{}",
                error_annotation(&format!("Failed to execute action: {e}"))
            );
            ExitCode::FAILURE
        }
    }
}
