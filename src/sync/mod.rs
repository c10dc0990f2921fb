//! Branch sync engine
//!
//! Four stages run in order, each feeding the next:
//! 1. Resolve - pick the PR base branch
//! 2. Locate - find the open PR tracking (target, base)
//! 3. Sync - bring the target branch up to date with upstream (effectful)
//! 4. Reconcile - comment on the PR, or open one
//!
//! Decisions (base selection, PR matching, reconcile planning) are pure
//! functions; the effectful wrappers call the platform around them.

mod cancel;
mod locate;
mod pipeline;
mod reconcile;
mod resolve;
mod strategy;

pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use locate::{find_sync_pr, select_sync_pr};
pub use pipeline::{SyncOptions, SyncReport, run_sync};
pub use reconcile::{
    ReconcileAction, ReconcileResult, comment_body, execute_reconciliation, plan_reconciliation,
    pr_body, pr_title, should_create_pr,
};
pub use resolve::{
    BaseDecision, BaseSource, FALLBACK_BASE_BRANCH, ResolvedBase, plan_base_branch,
    resolve_base_branch,
};
pub use strategy::{TEMP_REF_PREFIX, commit_ref, is_commit_sha, sync_upstream, temp_ref_name};
