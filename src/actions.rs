//! GitHub Actions runner I/O
//!
//! Workflow command annotations on stdout and step outputs appended to the
//! file named by `GITHUB_OUTPUT`.

use crate::error::Result;
use crate::sync::{ReconcileResult, SyncReport};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Environment variable naming the step output file
pub const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";

/// Escape a workflow command message
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// `::error::` workflow command
pub fn error_annotation(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// `::warning::` workflow command
pub fn warning_annotation(message: &str) -> String {
    format!("::warning::{}", escape_data(message))
}

/// `::notice::` workflow command
pub fn notice_annotation(message: &str) -> String {
    format!("::notice::{}", escape_data(message))
}

/// Format one output entry
///
/// Multi-line values use the heredoc form with a delimiter that doesn't
/// occur in the value.
pub fn format_output(name: &str, value: &str) -> String {
    if !value.contains('\n') && !value.contains('\r') {
        return format!("{name}={value}\n");
    }

    let mut delimiter = format!("ghadelimiter_{}", Utc::now().timestamp_nanos_opt().unwrap_or(0));
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Step outputs describing a finished run
pub fn report_outputs(report: &SyncReport) -> Vec<(&'static str, String)> {
    let pr_number = report
        .result
        .as_ref()
        .and_then(ReconcileResult::pr_number)
        .map(|n| n.to_string())
        .unwrap_or_default();
    let pr_action = report
        .result
        .as_ref()
        .map_or("none", ReconcileResult::label);

    vec![
        ("sync-mode", report.mode.to_string()),
        ("base-branch", report.base.branch.clone()),
        (
            "merge-message",
            report.outcome.merge_message().unwrap_or_default().to_string(),
        ),
        ("pr-number", pr_number),
        ("pr-action", pr_action.to_string()),
    ]
}

/// Append outputs to the step output file
pub fn write_outputs(path: &Path, outputs: &[(&str, String)]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for (name, value) in outputs {
        file.write_all(format_output(name, value).as_bytes())?;
    }
    Ok(())
}
