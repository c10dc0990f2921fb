//! Sync command - bring the feature branch up to date and reconcile its PR

use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, Stylize, arrow, check};
use anstream::println;
use anyhow::{Result, anyhow};
use branch_sync::actions::{
    OUTPUT_FILE_ENV, notice_annotation, report_outputs, warning_annotation, write_outputs,
};
use branch_sync::config::RawInputs;
use branch_sync::sync::{
    BaseSource, ReconcileResult, SyncOptions, SyncReport, cancel_pair, run_sync,
};
use branch_sync::types::{RepointPath, SyncOutcome, SyncTarget};
use std::path::PathBuf;
use tokio::signal;
use tracing::warn;

/// Run the sync command
pub async fn run_sync_command(inputs: RawInputs) -> Result<()> {
    let ctx = CommandContext::new(inputs)?;
    let target = &ctx.config.target;

    println!(
        "{} {} {} {}",
        "Syncing".emphasis(),
        target.target_branch.accent(),
        "with".emphasis(),
        target.upstream_label().accent()
    );

    // A cancelled job gets SIGINT, then SIGTERM; either cancels the run and a
    // pending temporary ref is still deleted before we exit.
    let (cancel, token) = cancel_pair();
    let interrupt = tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });

    let options = SyncOptions {
        dry_run: ctx.config.dry_run,
        cancel: token,
    };
    let result = run_sync(ctx.platform.as_ref(), target, options).await;
    interrupt.abort();
    let report = result?;

    print_report(&report, target);

    if let Some(path) = std::env::var_os(OUTPUT_FILE_ENV).map(PathBuf::from) {
        write_outputs(&path, &report_outputs(&report))
            .map_err(|e| anyhow!("failed to write step outputs to {}: {e}", path.display()))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => warn!("received SIGINT; cancelling sync"),
        () = terminate => warn!("received SIGTERM; cancelling sync"),
    }
}

fn print_report(report: &SyncReport, target: &SyncTarget) {
    println!(
        "  {} base {} ({})",
        arrow(),
        report.base.branch.accent(),
        report.base.source.muted()
    );
    if report.base.source == BaseSource::DefaultBranch && report.base.is_head_of(target) {
        println!(
            "{}",
            warning_annotation(&format!(
                "Default branch {} is the branch being synced; set base-branch to open a PR",
                report.base.branch
            ))
        );
    }
    if report.base.source == BaseSource::Fallback {
        println!(
            "{}",
            warning_annotation(&format!(
                "Could not read the default branch; using {}",
                report.base.branch
            ))
        );
    }

    match &report.outcome {
        SyncOutcome::Merged(message) => {
            println!("{} Merged upstream: {}", check(), message);
        }
        SyncOutcome::Repointed { sha, path } => {
            let via = match path {
                RepointPath::Direct => String::new(),
                RepointPath::TemporaryRef(name) => format!(" via {}", name.muted()),
            };
            println!("{} Repointed to {}{via}", check(), sha.accent());
        }
        SyncOutcome::Planned(mode) => {
            println!("  {} would run {} sync", arrow(), mode.accent());
        }
    }

    match &report.result {
        Some(ReconcileResult::Commented(number)) => {
            println!("{} Commented on PR #{}", check(), number.accent());
        }
        Some(ReconcileResult::Created(pr)) => {
            println!("{} Created PR #{} {}", check(), pr.number.accent(), pr.html_url.muted());
            println!("{}", notice_annotation(&format!("Created sync PR #{}", pr.number)));
        }
        Some(ReconcileResult::Skipped) => {
            println!("  {} {}", arrow(), "No PR needed (branch is its own base)".muted());
        }
        None => {
            println!("  {} would {}", arrow(), report.action);
            println!("{}", "Dry run complete".muted());
            return;
        }
    }

    println!("{}", format!("{CHECK} Sync complete ({} mode)", report.mode).success());
}
