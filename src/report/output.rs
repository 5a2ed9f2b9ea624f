use super::TeamReport;
use crate::discovery::ActivityLedger;
use crate::model::{BranchActivity, BranchOutput, ReportOutput, Tier, TierReport, WeekBucket, SCHEMA_VERSION};
use anyhow::Result;
use chrono::Utc;
use console::style;

pub fn report_json(report: &TeamReport, ledger: &ActivityLedger, strategy: &str, repos: &[String]) -> ReportOutput {
    let usernames: Vec<&str> = report.contributors.iter().map(|c| c.username.as_str()).collect();
    let commits = usernames
        .iter()
        .flat_map(|u| ledger.commits_of(u))
        .cloned()
        .collect();

    ReportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        window: report.window,
        strategy: strategy.to_string(),
        repos: repos.to_vec(),
        contributors: report.contributors.clone(),
        teams: report.teams.clone(),
        weekly: report.weekly.clone(),
        failed_requests: report.failed_requests,
        commits,
    }
}

pub fn output_report_json(output: &ReportOutput) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

pub fn output_team_summary(report: &TeamReport) {
    println!("{}", style("Team Productivity Summary").bold());
    println!("{}", "─".repeat(50));
    println!("Window: {}", report.window);

    for team in &report.teams {
        println!("\n{} Team:", style(&team.team).cyan().bold());
        for member in report.contributors.iter().filter(|c| c.team == team.team) {
            println!("  {:<30} {:>5} commits", member.name, member.commits);
        }
        println!("  {:<30} {:>5} commits", style("Total").bold(), team.commits);
    }

    println!(
        "\n{} {} commits across {} contributors",
        style("All teams:").bold(),
        report.total_commits(),
        report.contributors.len()
    );
    if report.failed_requests > 0 {
        println!(
            "{} {} requests failed; totals reflect what could be fetched",
            style("warning:").yellow().bold(),
            report.failed_requests
        );
    }
}

fn intensity_char(count: u32, max: u32) -> &'static str {
    let intensity = ((count as f64 / max.max(1) as f64) * 5.0) as u32;
    match intensity {
        0 if count > 0 => "▁",
        0 => " ",
        1 => "▁",
        2 => "▃",
        3 => "▅",
        4 => "▇",
        _ => "█",
    }
}

pub fn output_weekly_trend(weekly: &[WeekBucket]) {
    if weekly.is_empty() {
        println!("No data to display");
        return;
    }

    let max_commits = weekly.iter().map(|b| b.commit_count).max().unwrap_or(1);

    println!("\n{}", style("Weekly Commit Trend").bold());
    println!("{}", "─".repeat(50));

    for bucket in weekly {
        let bar_len = if max_commits == 0 {
            0
        } else {
            (bucket.commit_count as usize * 30).div_ceil(max_commits as usize)
        };
        println!(
            "W{:<3} {} .. {} {} {:<30} {:>4}",
            bucket.week,
            bucket.start,
            bucket.end,
            style(intensity_char(bucket.commit_count, max_commits)).green(),
            style("█".repeat(bar_len)).green(),
            bucket.commit_count
        );
    }
}

pub fn branch_json(repo: &str, sample_size: usize, tiers: &TierReport) -> BranchOutput {
    BranchOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository: repo.to_string(),
        sample_size,
        total_analyzed: tiers.total(),
        tiers: tiers.clone(),
    }
}

pub fn output_branch_json(output: &BranchOutput) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

/// Advice derived from a tier report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchAdvice {
    /// Branches active within 90 days.
    pub active: usize,
    /// Suggested branch limit for commit discovery.
    pub search_scope: usize,
    pub cleanup_candidates: usize,
    /// Set when there are too few active branches to be representative.
    pub widen_to: Option<usize>,
}

pub fn advise(tiers: &TierReport) -> BranchAdvice {
    let active = tiers.very_active.len() + tiers.active.len();
    BranchAdvice {
        active,
        search_scope: active.min(50),
        cleanup_candidates: tiers.stale.len(),
        widen_to: (active < 20).then(|| active + tiers.somewhat_stale.len()),
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn print_branches(title: &str, branches: &[BranchActivity], limit: usize) {
    if branches.is_empty() {
        return;
    }
    println!("\n{}", style(title).bold());
    for b in branches.iter().take(limit) {
        let name: String = b.name.chars().take(40).collect();
        println!(
            "  {:<40} - {:>3} days ago ({}, {})",
            name, b.days_since_commit, b.last_commit_date, b.last_commit_hash_prefix
        );
    }
}

pub fn output_branch_summary(repo: &str, tiers: &TierReport) {
    let total = tiers.total();
    println!("{} {}", style("Branch Activity Analysis").bold(), style(repo).cyan());
    println!("{}", "─".repeat(60));

    if total == 0 {
        println!("No branches could be analyzed");
        return;
    }

    for tier in Tier::ALL {
        let count = tiers.tier(tier).len();
        let label = format!("{} ({}):", tier.label(), tier.range_label());
        let line = format!("{label:<32} {count:>3} branches ({:>5.1}%)", percent(count, total));
        let styled = match tier {
            Tier::VeryActive => style(line).green().bold(),
            Tier::Active => style(line).green(),
            Tier::SomewhatStale => style(line).yellow(),
            Tier::Stale => style(line).red(),
        };
        println!("{styled}");
    }
    if !tiers.skipped.is_empty() {
        println!("{} branches skipped after lookup errors", tiers.skipped.len());
    }

    print_branches("Very active branches (last 30 days)", &tiers.very_active, 5);
    print_branches("Active branches (31-90 days)", &tiers.active, 3);
    print_branches("Stalest branches (180+ days)", &tiers.stale, 3);

    let advice = advise(tiers);
    println!("\n{}", style("Recommendations").bold());
    match advice.widen_to {
        None => {
            println!("  Focus on {} active branches for commit analysis", advice.active);
            println!(
                "  This covers {:.1}% of branches but likely most recent activity",
                percent(advice.active, total)
            );
        }
        Some(widened) => {
            println!("  Consider including somewhat stale branches (total: {widened})");
        }
    }
    println!("  {} stale branches could potentially be cleaned up", advice.cleanup_candidates);
    println!("  Recommended search scope: {} branches", advice.search_scope);
}

pub fn output_branch_list(repo: &str, branches: &[String]) {
    println!("{} {} ({} branches)", style("Search list for").bold(), style(repo).cyan(), branches.len());
    for (i, name) in branches.iter().enumerate() {
        println!("{:>4}. {name}", i + 1);
    }
}
