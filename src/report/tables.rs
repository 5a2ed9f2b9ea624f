use crate::config::Roster;
use crate::discovery::ActivityLedger;
use crate::error::Result;
use crate::model::{CommitRecord, WeekBucket};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const COMMITS_FILE: &str = "team_productivity_report.csv";
pub const WEEKLY_FILE: &str = "weekly_commit_trend.csv";

#[derive(Debug, Serialize)]
struct CommitRow<'a> {
    username: &'a str,
    repo: &'a str,
    sha: &'a str,
    date: String,
    message: &'a str,
    url: &'a str,
    context: String,
    pr_number: Option<u64>,
    pr_title: Option<&'a str>,
}

impl<'a> From<&'a CommitRecord> for CommitRow<'a> {
    fn from(record: &'a CommitRecord) -> Self {
        let pr = record.context.pull_request();
        Self {
            username: &record.contributor,
            repo: &record.repo,
            sha: &record.sha,
            date: record.authored_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            message: &record.message,
            url: &record.url,
            context: record.context.to_string(),
            pr_number: pr.map(|(n, _)| n),
            pr_title: pr.map(|(_, t)| t),
        }
    }
}

#[derive(Debug, Serialize)]
struct WeekRow {
    week_number: u32,
    start_date: String,
    end_date: String,
    commit_count: u32,
}

/// One row per commit, members in roster order, commits in discovery order.
pub fn write_commits<W: Write>(out: W, ledger: &ActivityLedger, roster: &Roster) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let mut rows = 0;
    for member in &roster.members {
        for record in ledger.commits_of(&member.username) {
            writer.serialize(CommitRow::from(record))?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

/// Every bucket, including empty ones.
pub fn write_weekly<W: Write>(out: W, weekly: &[WeekBucket]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for bucket in weekly {
        writer.serialize(WeekRow {
            week_number: bucket.week,
            start_date: bucket.start.format("%Y-%m-%d").to_string(),
            end_date: bucket.end.format("%Y-%m-%d").to_string(),
            commit_count: bucket.commit_count,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write both tables under `dir` and return their paths.
pub fn write_all(
    dir: &Path,
    ledger: &ActivityLedger,
    roster: &Roster,
    weekly: &[WeekBucket],
) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;

    let commits_path = dir.join(COMMITS_FILE);
    let rows = write_commits(std::fs::File::create(&commits_path)?, ledger, roster)?;
    log::info!("Wrote {rows} commits to {}", commits_path.display());

    let weekly_path = dir.join(WEEKLY_FILE);
    write_weekly(std::fs::File::create(&weekly_path)?, weekly)?;
    log::info!("Wrote {} weeks to {}", weekly.len(), weekly_path.display());

    Ok((commits_path, weekly_path))
}
