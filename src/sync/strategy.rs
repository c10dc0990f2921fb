//! Upstream sync strategies
//!
//! Fork mode delegates to the platform's merge-upstream. Explicit mode
//! force-repoints the target branch at the upstream commit, which discards
//! any commits that exist only on the target branch.
//!
//! When the direct force-update is rejected (some configurations refuse a
//! SHA that no ref in the repository reaches yet), the commit is first
//! materialized as a temporary branch, the target is repointed at it, and
//! the temporary branch is deleted again whether or not the repoint worked.
//! A cancellation that arrives while the temporary branch exists cuts the
//! repoint short but still runs the delete.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::sync::cancel::CancelToken;
use crate::types::{RepoSlug, RepointPath, SyncOutcome, SyncTarget};
use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Prefix for temporary branches created by the fallback path
pub const TEMP_REF_PREFIX: &str = "temp-sync-";

static COMMIT_SHA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9a-fA-F]{40}|[0-9a-fA-F]{64})$").expect("valid regex")
});

/// Whether `value` is a full SHA-1 or SHA-256 commit id
pub fn is_commit_sha(value: &str) -> bool {
    COMMIT_SHA_RE.is_match(value)
}

/// Reference form accepted by the platform's commit lookup
///
/// Fully qualified refs lose their `refs/` prefix (`refs/tags/v1` becomes
/// `tags/v1`); branch names, tag names and abbreviated SHAs pass through.
pub fn commit_ref(upstream_branch: &str) -> &str {
    upstream_branch
        .strip_prefix("refs/")
        .unwrap_or(upstream_branch)
}

/// Generate a temporary branch name unique to this run
pub fn temp_ref_name() -> String {
    let now = Utc::now();
    format!(
        "{TEMP_REF_PREFIX}{}{:09}",
        now.timestamp(),
        now.timestamp_subsec_nanos()
    )
}

/// Update the target branch from its upstream
pub async fn sync_upstream(
    platform: &dyn PlatformService,
    target: &SyncTarget,
    cancel: &CancelToken,
) -> Result<SyncOutcome> {
    match &target.upstream_repo {
        None => merge_fork_upstream(platform, &target.target_branch).await,
        Some(upstream) => {
            let sha = resolve_upstream_sha(platform, upstream, &target.upstream_branch).await?;
            repoint_branch(platform, &target.target_branch, &sha, cancel).await
        }
    }
}

async fn merge_fork_upstream(platform: &dyn PlatformService, branch: &str) -> Result<SyncOutcome> {
    let message = platform.merge_upstream(branch).await?;
    info!(branch, %message, "merged upstream changes");
    Ok(SyncOutcome::Merged(message))
}

async fn resolve_upstream_sha(
    platform: &dyn PlatformService,
    upstream: &RepoSlug,
    upstream_branch: &str,
) -> Result<String> {
    if is_commit_sha(upstream_branch) {
        return Ok(upstream_branch.to_string());
    }
    let sha = platform
        .resolve_commit(upstream, commit_ref(upstream_branch))
        .await?;
    debug!(%upstream, upstream_branch, %sha, "resolved upstream ref");
    Ok(sha)
}

/// A temporary branch owned by one sync run
///
/// Must be handed back through [`TempRef::release`]. If it is dropped
/// before the delete finished (the future was dropped mid-fallback), the
/// branch may be left on the remote and a warning names it.
struct TempRef {
    name: String,
    released: bool,
}

impl TempRef {
    async fn create(platform: &dyn PlatformService, sha: &str) -> Result<Self> {
        let name = temp_ref_name();
        platform.create_branch(&name, sha).await?;
        debug!(temp_ref = %name, sha, "created temporary ref");
        Ok(Self {
            name,
            released: false,
        })
    }

    /// Delete the temporary branch. Consumes the guard, so deletion is
    /// attempted exactly once.
    async fn release(mut self, platform: &dyn PlatformService) -> Result<()> {
        let result = platform.delete_branch(&self.name).await;
        self.released = true;
        result
    }
}

impl Drop for TempRef {
    fn drop(&mut self) {
        if !self.released {
            warn!(temp_ref = %self.name, "temporary ref was not cleaned up");
        }
    }
}

/// Steps of the explicit-mode repoint
enum RepointState {
    /// Force-update the target straight to the upstream commit
    DirectAttempt,
    /// Temporary branch exists at the upstream commit
    TempRefCreated(TempRef),
    /// Repoint via the temporary branch finished, failed or was cancelled
    Repointed {
        temp: TempRef,
        result: Result<String>,
    },
    /// Temporary branch cleanup attempted; terminal
    CleanedUp(Result<SyncOutcome>),
}

async fn repoint_branch(
    platform: &dyn PlatformService,
    branch: &str,
    sha: &str,
    cancel: &CancelToken,
) -> Result<SyncOutcome> {
    let mut state = RepointState::DirectAttempt;

    loop {
        state = match state {
            RepointState::DirectAttempt => match platform.update_branch(branch, sha, true).await {
                Ok(()) => {
                    info!(branch, sha, "repointed branch to upstream");
                    return Ok(SyncOutcome::Repointed {
                        sha: sha.to_string(),
                        path: RepointPath::Direct,
                    });
                }
                Err(e) => {
                    warn!(branch, error = %e, "direct update rejected; retrying via temporary ref");
                    cancel.check()?;
                    RepointState::TempRefCreated(TempRef::create(platform, sha).await?)
                }
            },
            RepointState::TempRefCreated(temp) => {
                let result = tokio::select! {
                    result = repoint_to_ref(platform, branch, &temp.name) => result,
                    () = cancel.cancelled() => {
                        warn!(temp_ref = %temp.name, "sync cancelled; cleaning up temporary ref");
                        Err(Error::Cancelled)
                    }
                };
                RepointState::Repointed { temp, result }
            }
            RepointState::Repointed { temp, result } => {
                let name = temp.name.clone();
                if let Err(e) = temp.release(platform).await {
                    warn!(temp_ref = %name, error = %e, "failed to delete temporary ref");
                } else {
                    debug!(temp_ref = %name, "deleted temporary ref");
                }
                RepointState::CleanedUp(result.map(|sha| SyncOutcome::Repointed {
                    sha,
                    path: RepointPath::TemporaryRef(name),
                }))
            }
            RepointState::CleanedUp(outcome) => {
                if outcome.is_ok() {
                    info!(branch, "repointed branch to upstream via temporary ref");
                }
                return outcome;
            }
        };
    }
}

/// Force `branch` to the commit `temp_ref` resolves to
async fn repoint_to_ref(
    platform: &dyn PlatformService,
    branch: &str,
    temp_ref: &str,
) -> Result<String> {
    let sha = platform
        .get_branch_sha(&platform.repo_slug(), temp_ref)
        .await?;
    platform.update_branch(branch, &sha, true).await?;
    Ok(sha)
}
