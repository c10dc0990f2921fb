//! Shared command context
//!
//! Validates inputs and builds the platform service before any stage runs.

use branch_sync::config::{RawInputs, SyncConfig};
use branch_sync::error::Result;
use branch_sync::platform::{GitHubService, PlatformService};

/// Everything a sync run needs
pub struct CommandContext {
    /// Validated configuration
    pub config: SyncConfig,
    /// Platform service (GitHub)
    pub platform: Box<dyn PlatformService>,
}

impl CommandContext {
    /// Validate inputs and create the platform service
    pub fn new(inputs: RawInputs) -> Result<Self> {
        let config = SyncConfig::from_inputs(inputs)?;

        let platform = GitHubService::new(
            &config.token,
            config.target.owner.clone(),
            config.target.repo.clone(),
            &config.api_url,
        )?;

        Ok(Self {
            config,
            platform: Box::new(platform),
        })
    }
}
