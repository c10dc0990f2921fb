//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use branch_sync::error::{Error, Result};
use branch_sync::platform::PlatformService;
use branch_sync::types::{NewPullRequest, PlatformConfig, PrState, PullRequest, RepoSlug};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;

/// Call record for `create_pr_comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentCall {
    pub pr_number: u64,
    pub body: String,
}

/// Call record for `update_branch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBranchCall {
    pub branch: String,
    pub sha: String,
    pub force: bool,
}

/// Every platform call, in the order it was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    DefaultBranch,
    ListOpenPrs(String),
    CreatePr(NewPullRequest),
    CreateComment(CreateCommentCall),
    MergeUpstream(String),
    ResolveCommit { repo: String, reference: String },
    GetBranchSha { repo: String, branch: String },
    UpdateBranch(UpdateBranchCall),
    CreateBranch { branch: String, sha: String },
    DeleteBranch(String),
}

impl PlatformCall {
    /// Whether this call changes state on the platform
    pub const fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::CreatePr(_)
                | Self::CreateComment(_)
                | Self::MergeUpstream(_)
                | Self::UpdateBranch(_)
                | Self::CreateBranch { .. }
                | Self::DeleteBranch(_)
        )
    }
}

/// Simple mock platform service for testing
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Ordered call log for verification
/// - In-memory branch → SHA table per repository, so created temporary
///   branches can be read back and deleted
/// - Tags per repository for upstream commit resolution
/// - Error injection for failure path testing
/// - A switch that makes reads of the fork's own branches hang, for
///   cancelling a run mid-fallback
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    default_branch: Mutex<Option<String>>,
    open_prs: Mutex<Vec<PullRequest>>,
    merge_message: Mutex<String>,
    branches: Mutex<HashMap<(String, String), String>>,
    tags: Mutex<HashMap<(String, String), String>>,
    hang_own_branch_reads: AtomicBool,
    read_hung: Notify,
    calls: Mutex<Vec<PlatformCall>>,
    // Error injection
    error_on_default_branch: Mutex<Option<String>>,
    error_on_list_prs: Mutex<Option<String>>,
    error_on_merge_upstream: Mutex<Option<String>>,
    /// Fail this many upcoming `update_branch` calls
    update_branch_failures: Mutex<usize>,
    error_on_create_branch: Mutex<Option<String>>,
    error_on_delete_branch: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
    error_on_comment: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(1),
            default_branch: Mutex::new(Some("main".to_string())),
            open_prs: Mutex::new(Vec::new()),
            merge_message: Mutex::new(
                "Successfully fetched and fast-forwarded from upstream".to_string(),
            ),
            branches: Mutex::new(HashMap::new()),
            tags: Mutex::new(HashMap::new()),
            hang_own_branch_reads: AtomicBool::new(false),
            read_hung: Notify::new(),
            calls: Mutex::new(Vec::new()),
            error_on_default_branch: Mutex::new(None),
            error_on_list_prs: Mutex::new(None),
            error_on_merge_upstream: Mutex::new(None),
            update_branch_failures: Mutex::new(0),
            error_on_create_branch: Mutex::new(None),
            error_on_delete_branch: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
            error_on_comment: Mutex::new(None),
        }
    }

    // === Response setup ===

    /// Set the repository default branch
    pub fn set_default_branch(&self, branch: &str) {
        *self.default_branch.lock().unwrap() = Some(branch.to_string());
    }

    /// Add an open PR visible to `list_open_prs`
    pub fn add_open_pr(&self, pr: PullRequest) {
        self.open_prs.lock().unwrap().push(pr);
    }

    /// Set the message returned by `merge_upstream`
    pub fn set_merge_message(&self, message: &str) {
        *self.merge_message.lock().unwrap() = message.to_string();
    }

    /// Seed a branch in any repository
    pub fn set_branch(&self, repo: &RepoSlug, branch: &str, sha: &str) {
        self.branches
            .lock()
            .unwrap()
            .insert((repo.to_string(), branch.to_string()), sha.to_string());
    }

    /// Seed a tag in any repository
    pub fn set_tag(&self, repo: &RepoSlug, tag: &str, sha: &str) {
        self.tags
            .lock()
            .unwrap()
            .insert((repo.to_string(), tag.to_string()), sha.to_string());
    }

    /// Current SHA of a branch in the fork repository
    pub fn own_branch(&self, branch: &str) -> Option<String> {
        let key = (self.repo_slug().to_string(), branch.to_string());
        self.branches.lock().unwrap().get(&key).cloned()
    }

    // === Error injection methods ===

    /// Make `default_branch` return an error
    pub fn fail_default_branch(&self, msg: &str) {
        *self.error_on_default_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_open_prs` return an error
    pub fn fail_list_prs(&self, msg: &str) {
        *self.error_on_list_prs.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_upstream` return an error
    pub fn fail_merge_upstream(&self, msg: &str) {
        *self.error_on_merge_upstream.lock().unwrap() = Some(msg.to_string());
    }

    /// Make the next `count` calls to `update_branch` fail
    pub fn fail_update_branch(&self, count: usize) {
        *self.update_branch_failures.lock().unwrap() = count;
    }

    /// Make `create_branch` return an error
    pub fn fail_create_branch(&self, msg: &str) {
        *self.error_on_create_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `delete_branch` return an error
    pub fn fail_delete_branch(&self, msg: &str) {
        *self.error_on_delete_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr_comment` return an error
    pub fn fail_comment(&self, msg: &str) {
        *self.error_on_comment.lock().unwrap() = Some(msg.to_string());
    }

    /// Make every `get_branch_sha` on the fork repository pend forever
    pub fn hang_own_branch_reads(&self) {
        self.hang_own_branch_reads.store(true, Ordering::SeqCst);
    }

    /// Wait until a read has started hanging
    pub async fn read_hung(&self) {
        self.read_hung.notified().await;
    }

    // === Call verification methods ===

    /// All calls in order
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    /// All `create_pr` calls
    pub fn create_pr_calls(&self) -> Vec<NewPullRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::CreatePr(pr) => Some(pr),
                _ => None,
            })
            .collect()
    }

    /// All `create_pr_comment` calls
    pub fn comment_calls(&self) -> Vec<CreateCommentCall> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::CreateComment(comment) => Some(comment),
                _ => None,
            })
            .collect()
    }

    /// All `update_branch` calls
    pub fn update_branch_calls(&self) -> Vec<UpdateBranchCall> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::UpdateBranch(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    /// Names passed to `create_branch`
    pub fn created_branches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::CreateBranch { branch, .. } => Some(branch),
                _ => None,
            })
            .collect()
    }

    /// Names passed to `delete_branch`
    pub fn deleted_branches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::DeleteBranch(branch) => Some(branch),
                _ => None,
            })
            .collect()
    }

    /// Number of calls that change platform state
    pub fn mutating_call_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_mutating()).count()
    }

    /// Assert that `create_pr` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }

    /// Assert that no PR was created
    pub fn assert_no_pr_created(&self) {
        let calls = self.create_pr_calls();
        assert!(calls.is_empty(), "Expected no create_pr but got: {calls:?}");
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(slot: &Mutex<Option<String>>) -> Result<()> {
        match slot.lock().unwrap().as_ref() {
            Some(msg) => Err(Error::Platform(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn default_branch(&self) -> Result<String> {
        self.record(PlatformCall::DefaultBranch);
        Self::injected(&self.error_on_default_branch)?;

        self.default_branch
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Platform("no default branch configured".to_string()))
    }

    async fn list_open_prs(&self, head_branch: &str) -> Result<Vec<PullRequest>> {
        self.record(PlatformCall::ListOpenPrs(head_branch.to_string()));
        Self::injected(&self.error_on_list_prs)?;

        // Server-side head filter only, like the real API
        Ok(self
            .open_prs
            .lock()
            .unwrap()
            .iter()
            .filter(|pr| pr.head_ref == head_branch)
            .cloned()
            .collect())
    }

    async fn create_pr(&self, pr: &NewPullRequest) -> Result<PullRequest> {
        self.record(PlatformCall::CreatePr(pr.clone()));
        Self::injected(&self.error_on_create_pr)?;

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(PullRequest {
            number,
            html_url: format!("https://github.com/me/fork/pull/{number}"),
            head_ref: pr.head.clone(),
            base_ref: pr.base.clone(),
            title: pr.title.clone(),
            state: PrState::Open,
        })
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.record(PlatformCall::CreateComment(CreateCommentCall {
            pr_number,
            body: body.to_string(),
        }));
        Self::injected(&self.error_on_comment)
    }

    async fn merge_upstream(&self, branch: &str) -> Result<String> {
        self.record(PlatformCall::MergeUpstream(branch.to_string()));
        Self::injected(&self.error_on_merge_upstream)?;
        Ok(self.merge_message.lock().unwrap().clone())
    }

    async fn resolve_commit(&self, repo: &RepoSlug, reference: &str) -> Result<String> {
        self.record(PlatformCall::ResolveCommit {
            repo: repo.to_string(),
            reference: reference.to_string(),
        });

        let lookup = |table: &Mutex<HashMap<(String, String), String>>, name: &str| {
            table
                .lock()
                .unwrap()
                .get(&(repo.to_string(), name.to_string()))
                .cloned()
        };
        let found = if let Some(branch) = reference.strip_prefix("heads/") {
            lookup(&self.branches, branch)
        } else if let Some(tag) = reference.strip_prefix("tags/") {
            lookup(&self.tags, tag)
        } else {
            lookup(&self.branches, reference).or_else(|| lookup(&self.tags, reference))
        };
        found.ok_or_else(|| Error::Platform(format!("No commit found for SHA: {reference}")))
    }

    async fn get_branch_sha(&self, repo: &RepoSlug, branch: &str) -> Result<String> {
        self.record(PlatformCall::GetBranchSha {
            repo: repo.to_string(),
            branch: branch.to_string(),
        });

        if self.hang_own_branch_reads.load(Ordering::SeqCst) && *repo == self.repo_slug() {
            self.read_hung.notify_one();
            std::future::pending::<()>().await;
        }

        let key = (repo.to_string(), branch.to_string());
        self.branches
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::Platform(format!("Reference does not exist: {repo}:{branch}")))
    }

    async fn update_branch(&self, branch: &str, sha: &str, force: bool) -> Result<()> {
        self.record(PlatformCall::UpdateBranch(UpdateBranchCall {
            branch: branch.to_string(),
            sha: sha.to_string(),
            force,
        }));

        {
            let mut failures = self.update_branch_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(Error::Platform("Object does not exist".to_string()));
            }
        }

        self.set_branch(&self.repo_slug(), branch, sha);
        Ok(())
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        self.record(PlatformCall::CreateBranch {
            branch: branch.to_string(),
            sha: sha.to_string(),
        });
        Self::injected(&self.error_on_create_branch)?;

        self.set_branch(&self.repo_slug(), branch, sha);
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.record(PlatformCall::DeleteBranch(branch.to_string()));
        Self::injected(&self.error_on_delete_branch)?;

        let key = (self.repo_slug().to_string(), branch.to_string());
        self.branches.lock().unwrap().remove(&key);
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
