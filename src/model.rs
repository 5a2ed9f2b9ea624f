use crate::error::{PulseError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SCHEMA_VERSION: u32 = 1;

/// Where a commit was observed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommitContext {
    Branch { name: String },
    /// Query without a branch parameter, answered from the default branch.
    AllBranches,
    PullRequest { number: u64, title: String },
    Unknown,
}

impl CommitContext {
    pub fn branch(name: impl Into<String>) -> Self {
        CommitContext::Branch { name: name.into() }
    }

    pub fn pull_request(&self) -> Option<(u64, &str)> {
        match self {
            CommitContext::PullRequest { number, title } => Some((*number, title.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for CommitContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitContext::Branch { name } => write!(f, "{name}"),
            CommitContext::AllBranches => write!(f, "all"),
            CommitContext::PullRequest { number, .. } => write!(f, "PR #{number}"),
            CommitContext::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub authored_at: DateTime<Utc>,
    pub message: String,
    pub url: String,
    pub repo: String,
    pub context: CommitContext,
    /// Roster handle the commit is attributed to.
    pub contributor: String,
}

impl CommitRecord {
    pub fn short_sha(&self) -> &str {
        self.sha.get(..8).unwrap_or(&self.sha)
    }

    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub username: String,
    pub name: String,
    pub team: String,
}

/// Inclusive calendar-date range. Bounds are interpreted in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(PulseError::InvalidDate(format!(
                "Invalid range: start ({start}) is after end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        let date = timestamp.date_naive();
        date >= self.start && date <= self.end
    }

    /// Lower bound in the form the commit-listing endpoint expects.
    pub fn since_param(&self) -> String {
        format!("{}T00:00:00Z", self.start.format("%Y-%m-%d"))
    }

    pub fn until_param(&self) -> String {
        format!("{}T23:59:59Z", self.end.format("%Y-%m-%d"))
    }

    /// `start..end` qualifier for the search mini-language.
    pub fn search_range(&self) -> String {
        format!("{}..{}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    VeryActive,
    Active,
    SomewhatStale,
    Stale,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::VeryActive, Tier::Active, Tier::SomewhatStale, Tier::Stale];

    /// Boundary values belong to the more active tier.
    pub fn from_days(days_since_commit: i64) -> Self {
        if days_since_commit <= 30 {
            Tier::VeryActive
        } else if days_since_commit <= 90 {
            Tier::Active
        } else if days_since_commit <= 180 {
            Tier::SomewhatStale
        } else {
            Tier::Stale
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::VeryActive => "Very Active",
            Tier::Active => "Active",
            Tier::SomewhatStale => "Somewhat Stale",
            Tier::Stale => "Stale",
        }
    }

    pub fn range_label(&self) -> &'static str {
        match self {
            Tier::VeryActive => "<=30 days",
            Tier::Active => "31-90 days",
            Tier::SomewhatStale => "91-180 days",
            Tier::Stale => "180+ days",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchActivity {
    pub name: String,
    pub days_since_commit: i64,
    pub last_commit_date: NaiveDate,
    pub last_commit_hash_prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierReport {
    pub very_active: Vec<BranchActivity>,
    pub active: Vec<BranchActivity>,
    pub somewhat_stale: Vec<BranchActivity>,
    pub stale: Vec<BranchActivity>,
    /// Branches whose tip lookup failed.
    pub skipped: Vec<String>,
}

impl TierReport {
    pub fn tier(&self, tier: Tier) -> &[BranchActivity] {
        match tier {
            Tier::VeryActive => &self.very_active,
            Tier::Active => &self.active,
            Tier::SomewhatStale => &self.somewhat_stale,
            Tier::Stale => &self.stale,
        }
    }

    pub fn push(&mut self, branch: BranchActivity) {
        let bucket = match Tier::from_days(branch.days_since_commit) {
            Tier::VeryActive => &mut self.very_active,
            Tier::Active => &mut self.active,
            Tier::SomewhatStale => &mut self.somewhat_stale,
            Tier::Stale => &mut self.stale,
        };
        bucket.push(branch);
    }

    /// Freshest first in the active tiers, most neglected first in `stale`.
    pub fn sort(&mut self) {
        self.very_active.sort_by_key(|b| b.days_since_commit);
        self.active.sort_by_key(|b| b.days_since_commit);
        self.somewhat_stale.sort_by_key(|b| b.days_since_commit);
        self.stale.sort_by(|a, b| b.days_since_commit.cmp(&a.days_since_commit));
    }

    pub fn total(&self) -> usize {
        Tier::ALL.iter().map(|t| self.tier(*t).len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekBucket {
    pub week: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub commit_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorTotal {
    pub username: String,
    pub name: String,
    pub team: String,
    pub commits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTotal {
    pub team: String,
    pub members: Vec<String>,
    pub commits: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub window: DateWindow,
    pub strategy: String,
    pub repos: Vec<String>,
    pub contributors: Vec<ContributorTotal>,
    pub teams: Vec<TeamTotal>,
    pub weekly: Vec<WeekBucket>,
    pub failed_requests: usize,
    pub commits: Vec<CommitRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository: String,
    pub sample_size: usize,
    pub total_analyzed: usize,
    pub tiers: TierReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn tier_boundaries_belong_to_the_more_active_tier() {
        assert_eq!(Tier::from_days(0), Tier::VeryActive);
        assert_eq!(Tier::from_days(30), Tier::VeryActive);
        assert_eq!(Tier::from_days(31), Tier::Active);
        assert_eq!(Tier::from_days(90), Tier::Active);
        assert_eq!(Tier::from_days(91), Tier::SomewhatStale);
        assert_eq!(Tier::from_days(180), Tier::SomewhatStale);
        assert_eq!(Tier::from_days(181), Tier::Stale);
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(DateWindow::new(date("2025-03-31"), date("2025-01-01")).is_err());
    }

    #[test]
    fn window_contains_whole_end_day() {
        let window = DateWindow::new(date("2025-01-01"), date("2025-03-31")).unwrap();
        let late = DateTime::parse_from_rfc3339("2025-03-31T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let early = DateTime::parse_from_rfc3339("2024-12-31T23:59:59Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(window.contains(&late));
        assert!(!window.contains(&early));
        assert_eq!(window.since_param(), "2025-01-01T00:00:00Z");
        assert_eq!(window.until_param(), "2025-03-31T23:59:59Z");
        assert_eq!(window.search_range(), "2025-01-01..2025-03-31");
    }
}
