use crate::error::FetchFailure;
use crate::github::{GitHubClient, Transport, MAX_PAGE_SIZE};
use crate::model::{BranchActivity, TierReport};
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;

pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Sort a sample of `repo`'s branches into recency tiers by the author date
/// of their tip commit. The sample is one listing page, so it is capped at
/// 100. A branch whose tip cannot be resolved is logged, recorded in
/// `skipped`, and left out; only a failed listing fails the whole call.
pub fn classify_branches<T: Transport>(
    client: &GitHubClient<T>,
    repo: &str,
    sample_size: usize,
    now: DateTime<Utc>,
    progress: &ProgressBar,
) -> Result<TierReport, FetchFailure> {
    let sample = sample_size.clamp(1, MAX_PAGE_SIZE);
    let branches = client.list_branches(repo, sample).into_result()?;
    log::info!("Processing {} branches of {repo}", branches.len());
    progress.set_length(branches.len() as u64);

    let mut report = TierReport::default();
    for branch in branches {
        progress.set_message(branch.name.clone());
        let tip = client
            .get_commit(repo, &branch.commit.sha)
            .and_then(|commit| {
                commit.authored_at().ok_or_else(|| {
                    crate::error::PulseError::lookup(&branch.commit.sha, "commit has no author date")
                })
            });

        match tip {
            Ok(authored_at) => {
                report.push(BranchActivity {
                    days_since_commit: days_between(authored_at, now),
                    last_commit_date: authored_at.date_naive(),
                    last_commit_hash_prefix: branch.commit.sha.chars().take(8).collect(),
                    name: branch.name,
                });
            }
            Err(e) => {
                log::warn!("Error processing branch {}: {e}", branch.name);
                report.skipped.push(branch.name);
            }
        }
        progress.inc(1);
    }

    report.sort();
    Ok(report)
}

/// Whole days elapsed, never negative.
pub fn days_between(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_days().max(0)
}
