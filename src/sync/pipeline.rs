//! Sync pipeline: resolve → locate → sync → reconcile

use crate::error::{Result, Stage};
use crate::platform::PlatformService;
use crate::sync::cancel::CancelToken;
use crate::sync::locate::find_sync_pr;
use crate::sync::reconcile::{
    ReconcileAction, ReconcileResult, execute_reconciliation, plan_reconciliation,
};
use crate::sync::resolve::{ResolvedBase, resolve_base_branch};
use crate::sync::strategy::sync_upstream;
use crate::types::{PullRequest, SyncMode, SyncOutcome, SyncTarget};
use tracing::info;

/// Options for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Resolve and locate only; make no changes
    pub dry_run: bool,
    /// Interrupts the run between stages and inside the repoint fallback
    pub cancel: CancelToken,
}

/// Everything a sync run decided and did
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Mode that ran
    pub mode: SyncMode,
    /// Resolved PR base
    pub base: ResolvedBase,
    /// Open PR tracking this sync, if one existed
    pub existing_pr: Option<PullRequest>,
    /// Result of the upstream sync
    pub outcome: SyncOutcome,
    /// Planned PR action
    pub action: ReconcileAction,
    /// What reconciliation did (`None` on a dry run)
    pub result: Option<ReconcileResult>,
}

/// Run one sync of `target`
///
/// Any failure after base resolution aborts the run and is tagged with the
/// stage it happened in. Cancellation is checked before each effectful
/// stage and surfaces as [`Error::Cancelled`](crate::error::Error::Cancelled).
pub async fn run_sync(
    platform: &dyn PlatformService,
    target: &SyncTarget,
    options: SyncOptions,
) -> Result<SyncReport> {
    let mode = target.mode();
    info!(
        %mode,
        target = %target.target_branch,
        upstream = %target.upstream_label(),
        dry_run = options.dry_run,
        "starting sync"
    );

    let base = resolve_base_branch(target, platform).await;

    let existing_pr = find_sync_pr(platform, &target.target_branch, &base.branch)
        .await
        .map_err(|e| e.in_stage(Stage::Locate))?;

    let outcome = if options.dry_run {
        SyncOutcome::Planned(mode)
    } else {
        options
            .cancel
            .check()
            .map_err(|e| e.in_stage(Stage::Sync))?;
        sync_upstream(platform, target, &options.cancel)
            .await
            .map_err(|e| e.in_stage(Stage::Sync))?
    };

    let action = plan_reconciliation(target, &base.branch, existing_pr.as_ref(), &outcome);

    let result = if options.dry_run {
        info!(%action, "dry run; skipping PR reconciliation");
        None
    } else {
        options
            .cancel
            .check()
            .map_err(|e| e.in_stage(Stage::Reconcile))?;
        Some(
            execute_reconciliation(&action, platform)
                .await
                .map_err(|e| e.in_stage(Stage::Reconcile))?,
        )
    };

    Ok(SyncReport {
        mode,
        base,
        existing_pr,
        outcome,
        action,
        result,
    })
}
