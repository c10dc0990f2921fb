//! branch-sync: keep a feature or fork branch in sync with its upstream
//!
//! Runs as a CI step. Each run updates the target branch from upstream,
//! either through GitHub's fork merge-upstream or by force-repointing it at
//! an explicitly named upstream repository/branch, then comments on the PR
//! that tracks the sync or opens one.

pub mod actions;
pub mod config;
pub mod error;
pub mod platform;
pub mod sync;
pub mod types;
