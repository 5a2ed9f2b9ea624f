pub mod chart;
pub mod exec;
pub mod output;
pub mod tables;

pub use exec::{branches_exec, exec};

use crate::config::Roster;
use crate::discovery::ActivityLedger;
use crate::model::{ContributorTotal, DateWindow, TeamTotal, WeekBucket};
use crate::week;

/// One member's weekly commit counts, for charting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSeries {
    pub username: String,
    pub name: String,
    pub counts: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSeries {
    pub team: String,
    pub members: Vec<MemberSeries>,
}

impl TeamSeries {
    /// Sum across members for each week.
    pub fn weekly_totals(&self) -> Vec<u32> {
        let weeks = self.members.iter().map(|m| m.counts.len()).max().unwrap_or(0);
        (0..weeks)
            .map(|i| self.members.iter().filter_map(|m| m.counts.get(i)).sum())
            .collect()
    }
}

/// Totals and series derived from a finished ledger. Read-only over the
/// ledger; members without commits appear with zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamReport {
    pub window: DateWindow,
    pub contributors: Vec<ContributorTotal>,
    pub teams: Vec<TeamTotal>,
    pub weekly: Vec<WeekBucket>,
    pub team_series: Vec<TeamSeries>,
    pub failed_requests: usize,
}

impl TeamReport {
    pub fn total_commits(&self) -> usize {
        self.contributors.iter().map(|c| c.commits).sum()
    }
}

pub fn assemble(ledger: &ActivityLedger, roster: &Roster, window: &DateWindow) -> TeamReport {
    let count = |username: &str| ledger.contributor(username).map_or(0, |c| c.total());

    let contributors = roster
        .members
        .iter()
        .map(|m| ContributorTotal {
            username: m.username.clone(),
            name: m.name.clone(),
            team: m.team.clone(),
            commits: count(&m.username),
        })
        .collect();

    let grouped = roster.teams();

    let teams = grouped
        .iter()
        .map(|(team, members)| TeamTotal {
            team: team.clone(),
            members: members.iter().map(|m| m.username.clone()).collect(),
            commits: members.iter().map(|m| count(&m.username)).sum(),
        })
        .collect();

    let team_series = grouped
        .iter()
        .map(|(team, members)| TeamSeries {
            team: team.clone(),
            members: members
                .iter()
                .map(|m| MemberSeries {
                    username: m.username.clone(),
                    name: m.name.clone(),
                    counts: week::weekly_counts(ledger.commits_of(&m.username), window),
                })
                .collect(),
        })
        .collect();

    TeamReport {
        window: *window,
        contributors,
        teams,
        weekly: week::weekly_series(ledger.all_commits(), window),
        team_series,
        failed_requests: ledger.failures().len(),
    }
}
