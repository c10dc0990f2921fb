//! Repository slug and API URL parsing

use crate::error::{Error, Result};
use crate::types::RepoSlug;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Public GitHub REST API
pub const DEFAULT_API_URL: &str = "https://api.github.com";

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)/([A-Za-z0-9._-]+)$")
        .expect("valid regex")
});

/// Parse `owner/name` into a [`RepoSlug`]
///
/// Surrounding whitespace and a trailing `.git` are ignored.
pub fn parse_repo_slug(input: &str) -> Result<RepoSlug> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let caps = SLUG_RE
        .captures(trimmed)
        .ok_or_else(|| Error::Config(format!("expected \"owner/name\", got \"{input}\"")))?;

    let name = &caps[2];
    if name == "." || name == ".." {
        return Err(Error::Config(format!("invalid repository name in \"{input}\"")));
    }

    Ok(RepoSlug {
        owner: caps[1].to_string(),
        name: name.to_string(),
    })
}

/// Validate an API base URL and strip any trailing slash
pub fn normalize_api_url(input: &str) -> Result<String> {
    let url = Url::parse(input.trim())
        .map_err(|e| Error::Config(format!("invalid API URL \"{input}\": {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "API URL must be http or https, got \"{input}\""
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
