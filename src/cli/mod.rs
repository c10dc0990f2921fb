//! CLI command implementations

pub mod context;
pub mod style;
pub mod sync;

pub use sync::run_sync_command;
