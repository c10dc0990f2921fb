//! Error types for branch-sync

use std::fmt;
use thiserror::Error;

/// Pipeline stage an error surfaced in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Locating an existing sync PR
    Locate,
    /// Updating the target branch from upstream
    Sync,
    /// Commenting on or creating the sync PR
    Reconcile,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locate => write!(f, "locating pull request"),
            Self::Sync => write!(f, "syncing branch"),
            Self::Reconcile => write!(f, "reconciling pull request"),
        }
    }
}

/// Errors produced by branch-sync
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration input
    #[error("configuration error: {0}")]
    Config(String),

    /// GitHub API returned an error we could not map
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Generic platform failure
    #[error("platform error: {0}")]
    Platform(String),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// octocrab failure other than an API error response
    #[error("GitHub client error: {0}")]
    Octocrab(octocrab::Error),

    /// The run was interrupted before it finished
    #[error("sync cancelled")]
    Cancelled,

    /// Failure writing runner files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error tagged with the stage it happened in
    #[error("{stage}: {inner}")]
    Stage {
        /// Stage that failed
        stage: Stage,
        /// Innermost error
        inner: Box<Self>,
    },
}

impl From<octocrab::Error> for Error {
    fn from(e: octocrab::Error) -> Self {
        match e {
            // Surface GitHub's own message verbatim
            octocrab::Error::GitHub { source, .. } => Self::GitHubApi(source.message),
            other => Self::Octocrab(other),
        }
    }
}

impl Error {
    /// Tag this error with a pipeline stage
    #[must_use]
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            // Keep the innermost stage
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                inner: Box::new(other),
            },
        }
    }

    /// Stage this error was tagged with, if any
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The error with any stage tag removed
    pub fn innermost(&self) -> &Self {
        match self {
            Self::Stage { inner, .. } => inner.innermost(),
            other => other,
        }
    }
}

/// Result alias for branch-sync
pub type Result<T> = std::result::Result<T, Error>;
