use super::{assemble, chart, output, tables};
use crate::activity::classify_branches;
use crate::branches::discover_branches;
use crate::cli::{BranchesArgs, CommonArgs, ReportArgs};
use crate::config::{is_owner_name, require_token, resolve_window, Roster};
use crate::discovery::{ActivityLedger, Discovery, DiscoveryOptions};
use crate::github::{GitHubClient, HttpTransport};
use anyhow::Context;
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

fn spinner(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}

fn bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

fn client(common: &CommonArgs) -> anyhow::Result<GitHubClient<HttpTransport>> {
    let token = require_token(common.token.as_deref())?;
    Ok(GitHubClient::new(HttpTransport::new(token)).with_base_url(common.api_url.as_str()))
}

pub fn exec(common: CommonArgs, args: ReportArgs) -> anyhow::Result<()> {
    let roster = Roster::load(&common.config)
        .with_context(|| format!("Failed to load roster {}", common.config.display()))?;
    let client = client(&common)?;

    let window = resolve_window(
        &common.window_sources(roster.window.as_ref()),
        Utc::now().date_naive(),
    )
    .context("Failed to resolve date range")?;

    let strategies = args.strategies();
    let scope = args.branch_scope(&roster);
    let contributors = roster.usernames();
    let progress = spinner(common.quiet || args.json);

    let mut ledger = ActivityLedger::with_contributors(&contributors);
    for strategy in &strategies {
        let discovery = Discovery::new(
            &client,
            DiscoveryOptions {
                strategy: *strategy,
                scope: scope.clone(),
                max_pr_results: args.max_pr_results,
            },
        )
        .with_progress(progress.clone());

        for repo in &roster.repos {
            discovery.discover_into(repo, &contributors, &window, &mut ledger);
        }
    }
    progress.finish_and_clear();

    let report = assemble(&ledger, &roster, &window);
    let strategy_label = strategies
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("+");

    if args.json {
        output::output_report_json(&output::report_json(&report, &ledger, &strategy_label, &roster.repos))?;
    } else {
        output::output_team_summary(&report);
        output::output_weekly_trend(&report.weekly);
    }

    if !args.no_csv {
        let (commits, weekly) = tables::write_all(&args.out_dir, &ledger, &roster, &report.weekly)
            .context("Failed to write CSV reports")?;
        if !args.json {
            println!("\n{} {}", style("Saved").green(), commits.display());
            println!("{} {}", style("Saved").green(), weekly.display());
        }
    }

    if !args.no_charts {
        let charts = chart::render_all(&args.out_dir, &report);
        if !args.json {
            for path in charts {
                println!("{} {}", style("Saved").green(), path.display());
            }
        }
    }

    Ok(())
}

pub fn branches_exec(common: CommonArgs, args: BranchesArgs) -> anyhow::Result<()> {
    if !is_owner_name(&args.repo) {
        anyhow::bail!("Repository '{}' is not in owner/name form", args.repo);
    }
    let client = client(&common)?;

    if args.list {
        let names = discover_branches(&client, &args.repo, args.sample, None);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&names)?);
        } else {
            output::output_branch_list(&args.repo, &names);
        }
        return Ok(());
    }

    let progress = bar(common.quiet || args.json);
    let tiers = match classify_branches(&client, &args.repo, args.sample, Utc::now(), &progress) {
        Ok(tiers) => tiers,
        Err(failure) => {
            log::warn!("Error fetching branches: {failure}");
            Default::default()
        }
    };
    progress.finish_and_clear();

    if args.json {
        output::output_branch_json(&output::branch_json(&args.repo, args.sample, &tiers))?;
    } else {
        output::output_branch_summary(&args.repo, &tiers);
    }

    Ok(())
}
