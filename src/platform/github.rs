//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{NewPullRequest, PlatformConfig, PrState, PullRequest, RepoSlug};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

// REST payloads for endpoints octocrab doesn't cover with force/merge-upstream semantics

#[derive(Serialize)]
struct MergeUpstreamPayload<'a> {
    branch: &'a str,
}

#[derive(Deserialize)]
struct MergeUpstreamResponse {
    message: Option<String>,
    merge_type: Option<String>,
}

#[derive(Serialize)]
struct CreateRefPayload<'a> {
    #[serde(rename = "ref")]
    ref_name: String,
    sha: &'a str,
}

#[derive(Serialize)]
struct UpdateRefPayload<'a> {
    sha: &'a str,
    force: bool,
}

#[derive(Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests (git refs, merge-upstream)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `api_url` is the REST base, e.g. `https://api.github.com` or
    /// `https://ghe.example.com/api/v3`.
    pub fn new(token: &str, owner: String, repo: String, api_url: &str) -> Result<Self> {
        let api_url = api_url.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_url.as_str())
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent(concat!("branch-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: PlatformConfig {
                owner,
                repo,
                api_url,
            },
            token: token.to_string(),
            http_client,
        })
    }

    fn repo_url(&self, repo: &RepoSlug, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{path}",
            self.config.api_url, repo.owner, repo.name
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

/// Percent-encode each segment of a branch name, keeping `/` separators
fn encode_branch(branch: &str) -> String {
    branch
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Turn a non-success response into an error carrying GitHub's message
async fn check_response(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);

    Err(Error::GitHubApi(format!(
        "{action} failed ({status}): {message}"
    )))
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    let state = match pr.state {
        Some(octocrab::models::IssueState::Open) => PrState::Open,
        Some(octocrab::models::IssueState::Closed) if pr.merged_at.is_some() => PrState::Merged,
        // IssueState is non-exhaustive, so use wildcard for Closed and any future variants
        Some(_) | None => PrState::Closed,
    };

    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        head_ref: pr.head.ref_field.clone(),
        base_ref: pr.base.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        state,
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn default_branch(&self) -> Result<String> {
        debug!("fetching default branch");
        let repo = self
            .client
            .repos(&self.config.owner, &self.config.repo)
            .get()
            .await?;

        let branch = repo.default_branch.ok_or_else(|| {
            Error::GitHubApi("repository response has no default_branch".to_string())
        })?;
        debug!(%branch, "fetched default branch");
        Ok(branch)
    }

    async fn list_open_prs(&self, head_branch: &str) -> Result<Vec<PullRequest>> {
        debug!(head_branch, "listing open PRs");
        let head = format!("{}:{}", &self.config.owner, head_branch);

        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(head)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        let result: Vec<PullRequest> = prs.items.iter().map(pr_from_octocrab).collect();
        debug!(head_branch, count = result.len(), "listed open PRs");
        Ok(result)
    }

    async fn create_pr(&self, pr: &NewPullRequest) -> Result<PullRequest> {
        debug!(head = %pr.head, base = %pr.base, "creating PR");
        let created = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(&pr.title, &pr.head, &pr.base)
            .body(&pr.body)
            .maintainer_can_modify(pr.maintainer_can_modify)
            .send()
            .await?;

        let result = pr_from_octocrab(&created);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        debug!(pr_number, "creating PR comment");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .create_comment(pr_number, body)
            .await?;
        debug!(pr_number, "created PR comment");
        Ok(())
    }

    async fn merge_upstream(&self, branch: &str) -> Result<String> {
        debug!(branch, "merging upstream");
        let url = self.repo_url(&self.repo_slug(), "/merge-upstream");

        let response = self
            .request(Method::POST, &url)
            .json(&MergeUpstreamPayload { branch })
            .send()
            .await?;
        let result: MergeUpstreamResponse = check_response(response, "merge upstream")
            .await?
            .json()
            .await?;

        debug!(branch, merge_type = ?result.merge_type, "merged upstream");
        Ok(result.message.unwrap_or_default())
    }

    async fn resolve_commit(&self, repo: &RepoSlug, reference: &str) -> Result<String> {
        debug!(%repo, reference, "resolving commit");
        let url = self.repo_url(repo, &format!("/commits/{}", encode_branch(reference)));

        let response = self.request(Method::GET, &url).send().await?;
        let commit: CommitResponse = check_response(response, &format!("resolve {reference}"))
            .await?
            .json()
            .await?;

        debug!(%repo, reference, sha = %commit.sha, "resolved commit");
        Ok(commit.sha)
    }

    async fn get_branch_sha(&self, repo: &RepoSlug, branch: &str) -> Result<String> {
        debug!(%repo, branch, "resolving branch");
        let url = self.repo_url(repo, &format!("/git/ref/heads/{}", encode_branch(branch)));

        let response = self.request(Method::GET, &url).send().await?;
        let git_ref: GitRef = check_response(response, &format!("read ref heads/{branch}"))
            .await?
            .json()
            .await?;

        debug!(%repo, branch, sha = %git_ref.object.sha, "resolved branch");
        Ok(git_ref.object.sha)
    }

    async fn update_branch(&self, branch: &str, sha: &str, force: bool) -> Result<()> {
        debug!(branch, sha, force, "updating branch ref");
        let url = self.repo_url(
            &self.repo_slug(),
            &format!("/git/refs/heads/{}", encode_branch(branch)),
        );

        let response = self
            .request(Method::PATCH, &url)
            .json(&UpdateRefPayload { sha, force })
            .send()
            .await?;
        check_response(response, &format!("update ref heads/{branch}")).await?;

        debug!(branch, "updated branch ref");
        Ok(())
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        debug!(branch, sha, "creating branch ref");
        let url = self.repo_url(&self.repo_slug(), "/git/refs");

        let response = self
            .request(Method::POST, &url)
            .json(&CreateRefPayload {
                ref_name: format!("refs/heads/{branch}"),
                sha,
            })
            .send()
            .await?;
        check_response(response, &format!("create ref heads/{branch}")).await?;

        debug!(branch, "created branch ref");
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "deleting branch ref");
        let url = self.repo_url(
            &self.repo_slug(),
            &format!("/git/refs/heads/{}", encode_branch(branch)),
        );

        let response = self.request(Method::DELETE, &url).send().await?;
        check_response(response, &format!("delete ref heads/{branch}")).await?;

        debug!(branch, "deleted branch ref");
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
