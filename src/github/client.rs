use super::fetch::{Fetched, PagedFetcher};
use super::transport::Transport;
use super::wire::{BranchRef, PullRequestRef, RawCommit};
use super::{DEFAULT_API_URL, MAX_PAGE_SIZE};
use crate::error::{FetchFailure, Result};
use crate::model::DateWindow;

/// Filters for the commit-listing endpoint.
#[derive(Debug, Clone, Copy)]
pub struct CommitQuery<'a> {
    pub author: Option<&'a str>,
    /// Branch name or SHA to start from; `None` lets the API use the default branch.
    pub branch: Option<&'a str>,
    pub window: &'a DateWindow,
}

pub struct GitHubClient<T> {
    fetcher: PagedFetcher<T>,
    base_url: String,
}

impl<T: Transport> GitHubClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            fetcher: PagedFetcher::new(transport),
            base_url: DEFAULT_API_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn branches_url(&self, repo: &str) -> String {
        format!("{}/repos/{}/branches", self.base_url, repo)
    }

    pub fn commits_url(&self, repo: &str) -> String {
        format!("{}/repos/{}/commits", self.base_url, repo)
    }

    pub fn commit_url(&self, repo: &str, sha: &str) -> String {
        format!("{}/repos/{}/commits/{}", self.base_url, repo, sha)
    }

    pub fn search_url(&self) -> String {
        format!("{}/search/issues", self.base_url)
    }

    pub fn pull_commits_url(&self, repo: &str, number: u64) -> String {
        format!("{}/repos/{}/pulls/{}/commits", self.base_url, repo, number)
    }

    /// Up to `limit` branches, in the order the API lists them.
    pub fn list_branches(&self, repo: &str, limit: usize) -> Fetched<BranchRef> {
        let url = self.branches_url(repo);
        let query = vec![param("per_page", limit.clamp(1, MAX_PAGE_SIZE))];
        self.fetcher
            .fetch_bounded(&url, &query, Some(limit))
            .decode(&url)
    }

    pub fn list_commits(&self, repo: &str, filter: &CommitQuery<'_>) -> Fetched<RawCommit> {
        let url = self.commits_url(repo);
        let mut query = Vec::with_capacity(5);
        if let Some(author) = filter.author {
            query.push(param("author", author));
        }
        if let Some(branch) = filter.branch {
            query.push(param("sha", branch));
        }
        query.push(param("since", filter.window.since_param()));
        query.push(param("until", filter.window.until_param()));
        query.push(param("per_page", MAX_PAGE_SIZE));

        self.fetcher.fetch_all(&url, &query).decode(&url)
    }

    pub fn get_commit(&self, repo: &str, sha: &str) -> Result<RawCommit> {
        let url = self.commit_url(repo, sha);
        let page = self.fetcher.transport().get(&url, &[])?;
        if !page.is_success() {
            return Err(FetchFailure::new(url, page.status, page.body).into());
        }
        Ok(serde_json::from_str(&page.body)?)
    }

    /// Pull requests opened by `author` in `repo` within the window. The
    /// search API caps results, so the walk stops at `max_results`.
    pub fn search_pull_requests(
        &self,
        repo: &str,
        author: &str,
        window: &DateWindow,
        max_results: usize,
    ) -> Fetched<PullRequestRef> {
        let url = self.search_url();
        let q = format!(
            "repo:{repo} type:pr author:{author} created:{}",
            window.search_range()
        );
        let query = vec![
            param("q", q),
            param("per_page", max_results.clamp(1, MAX_PAGE_SIZE)),
        ];
        self.fetcher
            .fetch_bounded(&url, &query, Some(max_results))
            .decode(&url)
    }

    pub fn pull_request_commits(&self, repo: &str, number: u64) -> Fetched<RawCommit> {
        let url = self.pull_commits_url(repo, number);
        let query = vec![param("per_page", MAX_PAGE_SIZE)];
        self.fetcher.fetch_all(&url, &query).decode(&url)
    }
}

fn param(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}
