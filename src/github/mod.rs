pub mod client;
#[cfg(test)]
pub mod fake;
pub mod fetch;
pub mod link;
pub mod transport;
pub mod wire;

pub use client::{CommitQuery, GitHubClient};
pub use fetch::{Fetched, PagedFetcher};
pub use transport::{HttpTransport, Page, Transport};
pub use wire::{BranchRef, PullRequestRef, RawCommit};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest `per_page` the REST API honours.
pub const MAX_PAGE_SIZE: usize = 100;
