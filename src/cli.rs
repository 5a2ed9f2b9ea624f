use crate::activity::DEFAULT_SAMPLE_SIZE;
use crate::branches::DEFAULT_BRANCH_LIMIT;
use crate::config::{Roster, WindowConfig, WindowSources};
use crate::discovery::{BranchScope, DiscoveryStrategy, DEFAULT_MAX_PR_RESULTS};
use crate::github::DEFAULT_API_URL;
use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "teampulse")]
#[command(about = "Team commit activity and branch recency reports from the GitHub API")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, default_value = "teampulse.toml", help = "Path to the roster file")]
    pub config: PathBuf,

    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true, help = "GitHub API token")]
    pub token: Option<String>,

    #[arg(long, global = true, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL, help = "GitHub API base URL")]
    pub api_url: String,

    #[arg(long, global = true, help = "Window start (YYYY-MM-DD, RFC3339, or natural language)")]
    pub since: Option<String>,

    #[arg(long, global = true, help = "Window end (YYYY-MM-DD, RFC3339, or natural language)")]
    pub until: Option<String>,

    #[arg(long, global = true, help = "Named window: q1..q4, 2025-q2, ytd, last-30-days, last-6-weeks")]
    pub preset: Option<String>,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "More log output (-v info, -vv debug)")]
    pub verbose: u8,

    #[arg(long, global = true, help = "Hide progress output")]
    pub quiet: bool,
}

impl CommonArgs {
    pub fn window_sources<'a>(&'a self, file: Option<&'a WindowConfig>) -> WindowSources<'a> {
        WindowSources {
            since: self.since.as_deref(),
            until: self.until.as_deref(),
            preset: self.preset.as_deref(),
            file,
            ..WindowSources::default()
        }
        .with_env()
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover commits for every roster member and write the team report
    Report(ReportArgs),
    /// Classify a repository's branches by how recently they were committed to
    Branches(BranchesArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// One author-filtered query per contributor per branch
    PerContributor,
    /// One query per branch, matched to the roster locally
    PerBranch,
    /// Commits of pull requests opened in the window
    PullRequest,
}

impl From<StrategyArg> for DiscoveryStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::PerContributor => DiscoveryStrategy::PerBranchPerContributor,
            StrategyArg::PerBranch => DiscoveryStrategy::PerBranchAllContributors,
            StrategyArg::PullRequest => DiscoveryStrategy::PullRequestBased,
        }
    }
}

#[derive(Args, Clone)]
pub struct ReportArgs {
    #[arg(long, value_enum, default_values_t = [StrategyArg::PerBranch], help = "Discovery strategy; repeat to combine")]
    pub strategy: Vec<StrategyArg>,

    #[arg(long = "branch", help = "Query only this branch (repeatable)")]
    pub branches: Vec<String>,

    #[arg(long, conflicts_with = "branches", help = "Query the default branch only")]
    pub default_branch_only: bool,

    #[arg(long, default_value_t = DEFAULT_BRANCH_LIMIT, help = "Branches to discover per repository")]
    pub branch_limit: usize,

    #[arg(long, help = "Keep only branches whose tip was authored by a roster member")]
    pub touched_only: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_PR_RESULTS, help = "Pull request search results per contributor")]
    pub max_pr_results: usize,

    #[arg(long, default_value = ".", help = "Directory for CSV and chart output")]
    pub out_dir: PathBuf,

    #[arg(long, help = "Skip CSV output")]
    pub no_csv: bool,

    #[arg(long, help = "Skip chart output")]
    pub no_charts: bool,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

impl ReportArgs {
    /// `--default-branch-only`, then `--branch`, then the roster's branch
    /// list, then discovery.
    pub fn branch_scope(&self, roster: &Roster) -> BranchScope {
        if self.default_branch_only {
            BranchScope::DefaultBranch
        } else if !self.branches.is_empty() {
            BranchScope::Fixed(self.branches.clone())
        } else if !roster.branches.is_empty() {
            BranchScope::Fixed(roster.branches.clone())
        } else {
            BranchScope::Discovered {
                limit: self.branch_limit,
                touched_only: self.touched_only,
            }
        }
    }

    /// Requested strategies in order, without repeats.
    pub fn strategies(&self) -> Vec<DiscoveryStrategy> {
        let mut out: Vec<DiscoveryStrategy> = Vec::new();
        for s in self.strategy.iter().copied().map(DiscoveryStrategy::from) {
            if !out.contains(&s) {
                out.push(s);
            }
        }
        out
    }
}

#[derive(Args, Clone)]
pub struct BranchesArgs {
    #[arg(help = "Repository as owner/name")]
    pub repo: String,

    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE, help = "Branches to sample (at most 100)")]
    pub sample: usize,

    #[arg(long, help = "Print the prioritized search list instead of tiers")]
    pub list: bool,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Report(args) => crate::report::exec(self.common, args),
            Commands::Branches(args) => crate::report::branches_exec(self.common, args),
        }
    }
}
