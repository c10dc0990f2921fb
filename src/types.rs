//! Core types for branch-sync

use std::fmt;

/// A repository identified as `owner/name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// How the target branch gets its upstream content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Platform fork-merge-upstream
    Fork,
    /// Force-repoint to an explicitly named upstream repository/branch
    Explicit,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fork => write!(f, "fork"),
            Self::Explicit => write!(f, "explicit"),
        }
    }
}

/// What is being synced and against what
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    /// Owner of the repository holding the target branch
    pub owner: String,
    /// Repository holding the target branch
    pub repo: String,
    /// Branch kept in sync
    pub target_branch: String,
    /// Upstream branch name or commit SHA
    pub upstream_branch: String,
    /// Explicit upstream repository (switches to explicit mode)
    pub upstream_repo: Option<RepoSlug>,
    /// Explicitly configured PR base
    pub base_branch: Option<String>,
}

impl SyncTarget {
    /// Sync mode implied by the configuration
    pub const fn mode(&self) -> SyncMode {
        if self.upstream_repo.is_some() {
            SyncMode::Explicit
        } else {
            SyncMode::Fork
        }
    }

    /// Whether this run tracks the branch with a PR against a distinct base.
    ///
    /// True for explicit syncs and whenever a base was requested.
    pub const fn is_branch_pr(&self) -> bool {
        self.upstream_repo.is_some() || self.base_branch.is_some()
    }

    /// Human-readable upstream source, `owner/name:branch` in explicit mode
    pub fn upstream_label(&self) -> String {
        match &self.upstream_repo {
            Some(slug) => format!("{slug}:{}", self.upstream_branch),
            None => self.upstream_branch.clone(),
        }
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// A pull request as returned by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// PR title
    pub title: String,
    /// Current state
    pub state: PrState,
}

/// Parameters for opening a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Head branch
    pub head: String,
    /// Base branch
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Allow maintainers of the base repository to push to the head branch
    pub maintainer_can_modify: bool,
}

/// Which path the explicit-mode repoint took
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepointPath {
    /// The direct force-update was accepted
    Direct,
    /// The direct update was rejected and the temporary ref indirection was used
    TemporaryRef(String),
}

/// Result of a successful upstream sync.
///
/// Failures are carried as `Err` and are always fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fork sync; carries the platform's merge message
    Merged(String),
    /// Explicit sync; the target branch now points at `sha`
    Repointed {
        /// Commit the target branch now points at
        sha: String,
        /// How the update was applied
        path: RepointPath,
    },
    /// Dry run; no mutating call was made
    Planned(SyncMode),
}

impl SyncOutcome {
    /// Platform merge message, if there is one
    pub fn merge_message(&self) -> Option<&str> {
        match self {
            Self::Merged(message) => Some(message),
            Self::Repointed { .. } | Self::Planned(_) => None,
        }
    }
}

/// Platform configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// REST API base, e.g. `https://api.github.com`
    pub api_url: String,
}
