//! Response shapes of the REST endpoints we call. Only the fields the
//! reports need are decoded.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ShaRef {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BranchRef {
    pub name: String,
    pub commit: ShaRef,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Signature {
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommitBody {
    #[serde(default)]
    pub message: String,
    pub author: Option<Signature>,
    pub committer: Option<Signature>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RawCommit {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
    pub commit: CommitBody,
    /// Null when the commit email is not linked to an account.
    pub author: Option<Account>,
}

impl RawCommit {
    /// Account login of the author, or `""` when there is none.
    pub fn author_login(&self) -> &str {
        self.author.as_ref().map(|a| a.login.as_str()).unwrap_or("")
    }

    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        self.commit
            .author
            .as_ref()
            .and_then(|s| s.date)
            .or_else(|| self.commit.committer.as_ref().and_then(|s| s.date))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PullRequestRef {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub user: Option<Account>,
}
