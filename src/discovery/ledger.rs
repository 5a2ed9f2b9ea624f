use crate::error::FetchFailure;
use crate::model::CommitRecord;
use std::collections::{BTreeMap, HashSet};

/// One contributor's commits, grouped by repository in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ContributorActivity {
    handle: String,
    repos: BTreeMap<String, Vec<CommitRecord>>,
    seen: HashSet<(String, String)>,
}

impl ContributorActivity {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            ..Self::default()
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Append unless `(repo, sha)` was already recorded. Returns whether the
    /// record was kept.
    fn record(&mut self, record: CommitRecord) -> bool {
        if !self.seen.insert((record.repo.clone(), record.sha.clone())) {
            return false;
        }
        self.repos.entry(record.repo.clone()).or_default().push(record);
        true
    }

    pub fn repo(&self, repo: &str) -> &[CommitRecord] {
        self.repos.get(repo).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn repos(&self) -> impl Iterator<Item = (&str, &[CommitRecord])> {
        self.repos.iter().map(|(r, c)| (r.as_str(), c.as_slice()))
    }

    pub fn commits(&self) -> impl Iterator<Item = &CommitRecord> {
        self.repos.values().flatten()
    }

    pub fn total(&self) -> usize {
        self.seen.len()
    }
}

/// Result of a discovery run: contributor handle to deduplicated commits,
/// plus every fetch failure that was recovered from along the way.
#[derive(Debug, Clone, Default)]
pub struct ActivityLedger {
    contributors: BTreeMap<String, ContributorActivity>,
    failures: Vec<FetchFailure>,
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with an empty entry for each handle, so contributors without
    /// commits still show up in totals.
    pub fn with_contributors(handles: &[String]) -> Self {
        let mut ledger = Self::new();
        for handle in handles {
            ledger
                .contributors
                .entry(handle.clone())
                .or_insert_with(|| ContributorActivity::new(handle.clone()));
        }
        ledger
    }

    /// Stored under `record.contributor`; a repeated `(repo, sha)` for the
    /// same contributor is dropped.
    pub fn record(&mut self, record: CommitRecord) -> bool {
        let handle = record.contributor.clone();
        self.contributors
            .entry(handle.clone())
            .or_insert_with(|| ContributorActivity::new(handle))
            .record(record)
    }

    pub fn note_failure(&mut self, failure: FetchFailure) {
        log::warn!("{failure}");
        self.failures.push(failure);
    }

    pub fn failures(&self) -> &[FetchFailure] {
        &self.failures
    }

    pub fn contributor(&self, handle: &str) -> Option<&ContributorActivity> {
        self.contributors.get(handle)
    }

    pub fn contributors(&self) -> impl Iterator<Item = &ContributorActivity> {
        self.contributors.values()
    }

    pub fn commits_of(&self, handle: &str) -> Vec<&CommitRecord> {
        self.contributor(handle)
            .map(|c| c.commits().collect())
            .unwrap_or_default()
    }

    pub fn all_commits(&self) -> impl Iterator<Item = &CommitRecord> {
        self.contributors.values().flat_map(ContributorActivity::commits)
    }

    pub fn total_commits(&self) -> usize {
        self.contributors.values().map(ContributorActivity::total).sum()
    }
}
