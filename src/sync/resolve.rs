//! Base branch resolution

use crate::platform::PlatformService;
use crate::types::SyncTarget;
use std::fmt;
use tracing::{info, warn};

/// Base used when the default branch can't be looked up
pub const FALLBACK_BASE_BRANCH: &str = "main";

/// Why a base branch was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseSource {
    /// `base-branch` was configured
    Configured,
    /// Repository default branch
    DefaultBranch,
    /// Default branch lookup failed
    Fallback,
    /// Plain fork sync: the branch is its own base
    TargetBranch,
}

impl fmt::Display for BaseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured => write!(f, "configured"),
            Self::DefaultBranch => write!(f, "repository default branch"),
            Self::Fallback => write!(f, "fallback"),
            Self::TargetBranch => write!(f, "target branch"),
        }
    }
}

/// A resolved base branch and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBase {
    /// Branch name
    pub branch: String,
    /// How it was chosen
    pub source: BaseSource,
}

impl ResolvedBase {
    /// Whether a PR against this base would have `target`'s branch as both
    /// head and base
    pub fn is_head_of(&self, target: &SyncTarget) -> bool {
        self.branch == target.target_branch
    }
}

/// What resolution needs before it can produce a base
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseDecision {
    /// Base is known without asking the platform
    Known(ResolvedBase),
    /// Ask the platform for the default branch
    QueryDefaultBranch,
}

/// Decide how to resolve the base branch (pure)
pub fn plan_base_branch(target: &SyncTarget) -> BaseDecision {
    if let Some(base) = &target.base_branch {
        return BaseDecision::Known(ResolvedBase {
            branch: base.clone(),
            source: BaseSource::Configured,
        });
    }

    if target.is_branch_pr() {
        return BaseDecision::QueryDefaultBranch;
    }

    BaseDecision::Known(ResolvedBase {
        branch: target.target_branch.clone(),
        source: BaseSource::TargetBranch,
    })
}

/// Resolve the branch the sync PR should target
///
/// Never fails: a failed default branch lookup falls back to
/// [`FALLBACK_BASE_BRANCH`].
pub async fn resolve_base_branch(
    target: &SyncTarget,
    platform: &dyn PlatformService,
) -> ResolvedBase {
    let resolved = match plan_base_branch(target) {
        BaseDecision::Known(resolved) => resolved,
        BaseDecision::QueryDefaultBranch => match platform.default_branch().await {
            Ok(branch) => ResolvedBase {
                branch,
                source: BaseSource::DefaultBranch,
            },
            Err(e) => {
                warn!(error = %e, fallback = FALLBACK_BASE_BRANCH, "default branch lookup failed");
                ResolvedBase {
                    branch: FALLBACK_BASE_BRANCH.to_string(),
                    source: BaseSource::Fallback,
                }
            }
        },
    };

    if resolved.source == BaseSource::DefaultBranch && resolved.is_head_of(target) {
        warn!(
            branch = %resolved.branch,
            "default branch is the branch being synced; the platform will reject a PR from it onto itself"
        );
    }

    info!(
        base = %resolved.branch,
        source = %resolved.source,
        "resolved base branch"
    );
    resolved
}
