//! Locating the PR that tracks a sync

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::PullRequest;
use tracing::{debug, warn};

/// Pick the PR whose head and base both match exactly
///
/// The platform's head filter can't tell apart PRs that share a head but
/// target different bases, so both refs are compared here. If more than one
/// PR matches, the first is used and a warning is logged.
pub fn select_sync_pr(prs: Vec<PullRequest>, head: &str, base: &str) -> Option<PullRequest> {
    let mut matching = prs
        .into_iter()
        .filter(|pr| pr.head_ref == head && pr.base_ref == base);

    let first = matching.next()?;
    let extra: Vec<u64> = matching.map(|pr| pr.number).collect();
    if !extra.is_empty() {
        warn!(
            head,
            base,
            chosen = first.number,
            ignored = ?extra,
            "multiple open PRs match the same head and base; using the first"
        );
    }
    Some(first)
}

/// Find the open PR for `head` → `base`, if any
pub async fn find_sync_pr(
    platform: &dyn PlatformService,
    head: &str,
    base: &str,
) -> Result<Option<PullRequest>> {
    let prs = platform.list_open_prs(head).await?;
    let result = select_sync_pr(prs, head, base);

    if let Some(ref pr) = result {
        debug!(pr_number = pr.number, "found existing sync PR");
    } else {
        debug!(head, base, "no existing sync PR");
    }
    Ok(result)
}
