//! Run configuration built from action inputs and the runner environment

use crate::error::{Error, Result};
use crate::platform::{DEFAULT_API_URL, normalize_api_url, parse_repo_slug};
use crate::types::{RepoSlug, SyncTarget};

/// Raw inputs as supplied on the command line or by the Actions runner
///
/// The runner passes unset inputs as empty strings; those count as unset.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    /// `upstream-branch`
    pub upstream_branch: Option<String>,
    /// `feature-branch`
    pub feature_branch: Option<String>,
    /// `upstream-repo`
    pub upstream_repo: Option<String>,
    /// `base-branch`
    pub base_branch: Option<String>,
    /// `repo-token`
    pub repo_token: Option<String>,
    /// Repository to operate on (`GITHUB_REPOSITORY`)
    pub repository: Option<String>,
    /// REST API base (`GITHUB_API_URL`)
    pub api_url: Option<String>,
    /// Plan only
    pub dry_run: bool,
}

/// Validated configuration for one run
#[derive(Clone)]
pub struct SyncConfig {
    /// API token
    pub token: String,
    /// REST API base
    pub api_url: String,
    /// What to sync
    pub target: SyncTarget,
    /// Plan only
    pub dry_run: bool,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("target", &self.target)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, input: &str) -> Result<String> {
    present(value).ok_or_else(|| Error::Config(format!("input required and not supplied: {input}")))
}

/// Prefix a configuration error with the input it came from
fn for_input(input: &'static str) -> impl FnOnce(Error) -> Error {
    move |e| match e {
        Error::Config(msg) => Error::Config(format!("{input}: {msg}")),
        other => other,
    }
}

impl SyncConfig {
    /// Validate raw inputs
    pub fn from_inputs(inputs: RawInputs) -> Result<Self> {
        let token = required(inputs.repo_token, "repo-token")?;
        let upstream_branch = required(inputs.upstream_branch, "upstream-branch")?;
        let target_branch = required(inputs.feature_branch, "feature-branch")?;

        let repository: RepoSlug = parse_repo_slug(&required(inputs.repository, "repository")?)
            .map_err(for_input("repository"))?;

        let upstream_repo = present(inputs.upstream_repo)
            .map(|slug| parse_repo_slug(&slug))
            .transpose()
            .map_err(for_input("upstream-repo"))?;

        let api_url = normalize_api_url(
            &present(inputs.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )
        .map_err(for_input("api-url"))?;

        Ok(Self {
            token,
            api_url,
            target: SyncTarget {
                owner: repository.owner,
                repo: repository.name,
                target_branch,
                upstream_branch,
                upstream_repo,
                base_branch: present(inputs.base_branch),
            },
            dry_run: inputs.dry_run,
        })
    }
}
