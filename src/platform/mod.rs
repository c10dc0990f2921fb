//! Platform services for GitHub
//!
//! Provides the repository, pull request, and reference operations the sync
//! pipeline is built on.

mod detection;
mod github;

pub use detection::{DEFAULT_API_URL, normalize_api_url, parse_repo_slug};
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{NewPullRequest, PlatformConfig, PullRequest, RepoSlug};
use async_trait::async_trait;

/// Platform service trait for repository, PR, and ref operations
///
/// All operations act on the repository named by [`config`], except
/// [`resolve_commit`] and [`get_branch_sha`] which can read any repository
/// the token can see.
///
/// [`config`]: Self::config
/// [`resolve_commit`]: Self::resolve_commit
/// [`get_branch_sha`]: Self::get_branch_sha
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Get the repository's default branch
    async fn default_branch(&self) -> Result<String>;

    /// List open PRs whose head is `owner:head_branch`
    async fn list_open_prs(&self, head_branch: &str) -> Result<Vec<PullRequest>>;

    /// Open a new PR
    async fn create_pr(&self, pr: &NewPullRequest) -> Result<PullRequest>;

    /// Create a comment on a PR
    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()>;

    /// Merge the fork's upstream into `branch`, returning the platform's message
    async fn merge_upstream(&self, branch: &str) -> Result<String>;

    /// Resolve a branch, tag, `heads/`/`tags/` ref or abbreviated SHA in
    /// `repo` to a full commit SHA
    async fn resolve_commit(&self, repo: &RepoSlug, reference: &str) -> Result<String>;

    /// Resolve `refs/heads/<branch>` of `repo` to a commit SHA
    async fn get_branch_sha(&self, repo: &RepoSlug, branch: &str) -> Result<String>;

    /// Point `refs/heads/<branch>` at `sha`
    async fn update_branch(&self, branch: &str, sha: &str, force: bool) -> Result<()>;

    /// Create `refs/heads/<branch>` at `sha`
    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()>;

    /// Delete `refs/heads/<branch>`
    async fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;

    /// The repository this service acts on
    fn repo_slug(&self) -> RepoSlug {
        let config = self.config();
        RepoSlug {
            owner: config.owner.clone(),
            name: config.repo.clone(),
        }
    }
}
