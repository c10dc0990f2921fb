//! PR reconciliation: comment on the tracking PR or open one

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{NewPullRequest, PullRequest, RepointPath, SyncOutcome, SyncTarget};
use std::fmt;
use tracing::{debug, info};

/// What reconciliation will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Comment on the existing PR
    Comment {
        /// PR number
        pr_number: u64,
        /// Comment text
        body: String,
    },
    /// Open a new PR
    Create(NewPullRequest),
    /// Nothing to do (self-sync with no distinct base)
    Nothing,
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment { pr_number, .. } => write!(f, "comment on PR #{pr_number}"),
            Self::Create(pr) => write!(f, "create PR {} → {}", pr.head, pr.base),
            Self::Nothing => write!(f, "no PR action"),
        }
    }
}

/// What reconciliation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileResult {
    /// Commented on an existing PR
    Commented(u64),
    /// Opened a new PR
    Created(PullRequest),
    /// Took no action
    Skipped,
}

impl ReconcileResult {
    /// Number of the PR that was touched
    pub const fn pr_number(&self) -> Option<u64> {
        match self {
            Self::Commented(number) => Some(*number),
            Self::Created(pr) => Some(pr.number),
            Self::Skipped => None,
        }
    }

    /// Short label for step outputs
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Commented(_) => "commented",
            Self::Created(_) => "created",
            Self::Skipped => "none",
        }
    }
}

/// Whether a missing PR should be opened
///
/// A plain fork sync with no explicit base has head == base, so there is
/// nothing to diff.
pub fn should_create_pr(target: &SyncTarget, base: &str) -> bool {
    target.is_branch_pr() || target.target_branch != base
}

/// Title for a new sync PR
pub fn pr_title(target: &SyncTarget) -> String {
    format!(
        "Sync {} with {}",
        target.target_branch,
        target.upstream_label()
    )
}

/// Body for a new sync PR
pub fn pr_body(target: &SyncTarget, outcome: &SyncOutcome) -> String {
    let mut body = format!(
        "Automated pull request to keep {} up to date with {}.",
        target.target_branch,
        target.upstream_label()
    );

    match outcome {
        SyncOutcome::Merged(message) if !message.is_empty() => {
            body.push_str(&format!("\n\nUpstream merge: {message}"));
        }
        SyncOutcome::Repointed { sha, .. } => {
            body.push_str(&format!(
                "\n\n{} was force-reset to `{sha}`. Commits that only existed on {} were discarded.",
                target.target_branch, target.target_branch
            ));
        }
        SyncOutcome::Merged(_) | SyncOutcome::Planned(_) => {}
    }
    body
}

/// Comment posted on an existing sync PR
pub fn comment_body(target: &SyncTarget, outcome: &SyncOutcome) -> String {
    let mut body = match &target.upstream_repo {
        Some(_) => format!(
            "Updated with the latest changes from {}.",
            target.upstream_label()
        ),
        None => format!(
            "Updated with the latest changes from the upstream branch {}.",
            target.upstream_branch
        ),
    };

    match outcome {
        SyncOutcome::Merged(message) if !message.is_empty() => {
            body.push_str(&format!("\n\n{message}"));
        }
        SyncOutcome::Repointed { sha, path } => {
            body.push_str(&format!("\n\n{} now points at `{sha}`", target.target_branch));
            if let RepointPath::TemporaryRef(_) = path {
                body.push_str(" (applied via a temporary ref)");
            }
            body.push('.');
        }
        SyncOutcome::Merged(_) | SyncOutcome::Planned(_) => {}
    }
    body
}

/// Decide how to reconcile the tracking PR (pure)
pub fn plan_reconciliation(
    target: &SyncTarget,
    base: &str,
    existing: Option<&PullRequest>,
    outcome: &SyncOutcome,
) -> ReconcileAction {
    if let Some(pr) = existing {
        return ReconcileAction::Comment {
            pr_number: pr.number,
            body: comment_body(target, outcome),
        };
    }

    if !should_create_pr(target, base) {
        return ReconcileAction::Nothing;
    }

    ReconcileAction::Create(NewPullRequest {
        head: target.target_branch.clone(),
        base: base.to_string(),
        title: pr_title(target),
        body: pr_body(target, outcome),
        maintainer_can_modify: true,
    })
}

/// Carry out a reconcile action (EFFECTFUL)
pub async fn execute_reconciliation(
    action: &ReconcileAction,
    platform: &dyn PlatformService,
) -> Result<ReconcileResult> {
    match action {
        ReconcileAction::Comment { pr_number, body } => {
            platform.create_pr_comment(*pr_number, body).await?;
            info!(pr_number, "commented on existing PR");
            Ok(ReconcileResult::Commented(*pr_number))
        }
        ReconcileAction::Create(new_pr) => {
            let pr = platform.create_pr(new_pr).await?;
            info!(pr_number = pr.number, url = %pr.html_url, "created PR");
            Ok(ReconcileResult::Created(pr))
        }
        ReconcileAction::Nothing => {
            debug!("no PR to update and none needed");
            Ok(ReconcileResult::Skipped)
        }
    }
}
