//! Commit discovery: turn (repository, contributor, window) into a
//! deduplicated [`ActivityLedger`] using one of three query strategies.
//!
//! Every strategy funnels raw commits through [`admit`], which applies the
//! window filter on the commit's own author date, and through
//! [`ActivityLedger::record`], which drops repeated hashes per contributor.
//! A failed request only ends its own loop; the failure is kept in the
//! ledger and the run moves on to the next branch or contributor.

pub mod ledger;
mod per_branch;
mod per_contributor;
mod pull_request;

pub use ledger::{ActivityLedger, ContributorActivity};

use crate::branches;
use crate::github::{GitHubClient, RawCommit, Transport};
use crate::model::{CommitContext, CommitRecord, DateWindow};
use indicatif::ProgressBar;
use std::fmt;

/// The search API stops answering after 1000 results.
pub const DEFAULT_MAX_PR_RESULTS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryStrategy {
    /// One author-filtered query per contributor per branch.
    PerBranchPerContributor,
    /// One unfiltered query per branch, matched to contributors locally.
    PerBranchAllContributors,
    /// Commits of each contributor's pull requests created in the window.
    PullRequestBased,
}

impl fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiscoveryStrategy::PerBranchPerContributor => "per-contributor",
            DiscoveryStrategy::PerBranchAllContributors => "per-branch",
            DiscoveryStrategy::PullRequestBased => "pull-request",
        };
        f.write_str(name)
    }
}

/// Which branches the branch-walking strategies query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchScope {
    Fixed(Vec<String>),
    Discovered { limit: usize, touched_only: bool },
    /// No branch parameter: the API answers from the default branch.
    DefaultBranch,
}

impl Default for BranchScope {
    fn default() -> Self {
        BranchScope::Discovered {
            limit: branches::DEFAULT_BRANCH_LIMIT,
            touched_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BranchTarget {
    Default,
    Named(String),
}

impl BranchTarget {
    pub(crate) fn sha(&self) -> Option<&str> {
        match self {
            BranchTarget::Default => None,
            BranchTarget::Named(name) => Some(name),
        }
    }

    pub(crate) fn context(&self) -> CommitContext {
        match self {
            BranchTarget::Default => CommitContext::AllBranches,
            BranchTarget::Named(name) => CommitContext::branch(name.clone()),
        }
    }
}

impl fmt::Display for BranchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchTarget::Default => f.write_str("<default>"),
            BranchTarget::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub strategy: DiscoveryStrategy,
    pub scope: BranchScope,
    pub max_pr_results: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            strategy: DiscoveryStrategy::PerBranchAllContributors,
            scope: BranchScope::default(),
            max_pr_results: DEFAULT_MAX_PR_RESULTS,
        }
    }
}

pub struct Discovery<'a, T> {
    client: &'a GitHubClient<T>,
    options: DiscoveryOptions,
    progress: ProgressBar,
}

impl<'a, T: Transport> Discovery<'a, T> {
    pub fn new(client: &'a GitHubClient<T>, options: DiscoveryOptions) -> Self {
        Self {
            client,
            options,
            progress: ProgressBar::hidden(),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Discover one repository.
    pub fn discover(&self, repo: &str, contributors: &[String], window: &DateWindow) -> ActivityLedger {
        let mut ledger = ActivityLedger::with_contributors(contributors);
        self.discover_into(repo, contributors, window, &mut ledger);
        ledger
    }

    /// Discover every repository into one ledger.
    pub fn run(&self, repos: &[String], contributors: &[String], window: &DateWindow) -> ActivityLedger {
        let mut ledger = ActivityLedger::with_contributors(contributors);
        for repo in repos {
            self.discover_into(repo, contributors, window, &mut ledger);
        }
        ledger
    }

    /// Add this strategy's findings to an existing ledger. Commits already
    /// present, from any strategy, are not added again.
    pub fn discover_into(
        &self,
        repo: &str,
        contributors: &[String],
        window: &DateWindow,
        ledger: &mut ActivityLedger,
    ) {
        log::info!("Discovering {repo} ({}) for {window}", self.options.strategy);
        let before = ledger.total_commits();

        match self.options.strategy {
            DiscoveryStrategy::PerBranchPerContributor => {
                let targets = self.branch_targets(repo, contributors);
                per_contributor::discover(self.client, repo, contributors, &targets, window, ledger, &self.progress);
            }
            DiscoveryStrategy::PerBranchAllContributors => {
                let targets = self.branch_targets(repo, contributors);
                per_branch::discover(self.client, repo, contributors, &targets, window, ledger, &self.progress);
            }
            DiscoveryStrategy::PullRequestBased => {
                pull_request::discover(
                    self.client,
                    repo,
                    contributors,
                    window,
                    self.options.max_pr_results,
                    ledger,
                    &self.progress,
                );
            }
        }

        log::info!("{repo}: {} new commits", ledger.total_commits() - before);
    }

    fn branch_targets(&self, repo: &str, contributors: &[String]) -> Vec<BranchTarget> {
        match &self.options.scope {
            BranchScope::Fixed(names) => names.iter().cloned().map(BranchTarget::Named).collect(),
            BranchScope::DefaultBranch => vec![BranchTarget::Default],
            BranchScope::Discovered { limit, touched_only } => {
                let touched_by = touched_only.then_some(contributors);
                branches::discover_branches(self.client, repo, *limit, touched_by)
                    .into_iter()
                    .map(BranchTarget::Named)
                    .collect()
            }
        }
    }
}

/// Build a record for `contributor` if the commit's own author date falls
/// inside the window.
pub(crate) fn admit(
    raw: RawCommit,
    repo: &str,
    context: CommitContext,
    contributor: &str,
    window: &DateWindow,
) -> Option<CommitRecord> {
    let authored_at = raw.authored_at()?;
    if !window.contains(&authored_at) {
        return None;
    }
    Some(CommitRecord {
        sha: raw.sha,
        authored_at,
        message: raw.commit.message,
        url: raw.html_url,
        repo: repo.to_string(),
        context,
        contributor: contributor.to_string(),
    })
}
