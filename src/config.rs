use crate::error::{PulseError, Result};
use crate::model::{DateWindow, Member};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const START_ENV: &str = "TEAMPULSE_START_DATE";
pub const END_ENV: &str = "TEAMPULSE_END_DATE";

/// Fallback window when nothing else names one: the first quarter of 2025.
pub const DEFAULT_START: (i32, u32, u32) = (2025, 1, 1);
pub const DEFAULT_END: (i32, u32, u32) = (2025, 3, 31);

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WindowConfig {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// The roster file: who to count, where, and optionally which branches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub repos: Vec<String>,
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub window: Option<WindowConfig>,
}

impl Roster {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PulseError::ConfigMissing(format!(
                "roster file {} not found",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let roster: Roster = toml::from_str(text)?;
        roster.validate()?;
        Ok(roster)
    }

    fn validate(&self) -> Result<()> {
        if self.members.is_empty() {
            return Err(PulseError::ConfigMissing("roster has no members".to_string()));
        }
        if self.repos.is_empty() {
            return Err(PulseError::ConfigMissing("roster has no repos".to_string()));
        }
        if let Some(bad) = self.repos.iter().find(|r| !is_owner_name(r)) {
            return Err(PulseError::Parse(format!(
                "repository '{bad}' is not in owner/name form"
            )));
        }
        Ok(())
    }

    pub fn usernames(&self) -> Vec<String> {
        self.members.iter().map(|m| m.username.clone()).collect()
    }

    pub fn member(&self, username: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.username == username)
    }

    /// Team labels in order of first appearance, each with its members.
    pub fn teams(&self) -> Vec<(String, Vec<&Member>)> {
        let mut teams: Vec<(String, Vec<&Member>)> = Vec::new();
        for member in &self.members {
            match teams.iter_mut().find(|(name, _)| *name == member.team) {
                Some((_, members)) => members.push(member),
                None => teams.push((member.team.clone(), vec![member])),
            }
        }
        teams
    }
}

pub fn is_owner_name(repo: &str) -> bool {
    let mut parts = repo.split('/');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    )
}

pub fn require_token(token: Option<&str>) -> Result<String> {
    match token.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => Err(PulseError::ConfigMissing(
            "no GitHub token; set GITHUB_TOKEN or pass --token".to_string(),
        )),
    }
}

/// Every source a window bound can come from, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct WindowSources<'a> {
    pub since: Option<&'a str>,
    pub until: Option<&'a str>,
    pub preset: Option<&'a str>,
    pub env_start: Option<String>,
    pub env_end: Option<String>,
    pub file: Option<&'a WindowConfig>,
}

impl<'a> WindowSources<'a> {
    pub fn with_env(mut self) -> Self {
        self.env_start = std::env::var(START_ENV).ok().filter(|v| !v.trim().is_empty());
        self.env_end = std::env::var(END_ENV).ok().filter(|v| !v.trim().is_empty());
        self
    }
}

/// Resolve each bound independently: explicit flag, then preset, then
/// environment, then roster file, then the built-in default.
pub fn resolve_window(sources: &WindowSources<'_>, today: NaiveDate) -> Result<DateWindow> {
    let preset = sources.preset.map(|p| parse_preset(p, today)).transpose()?;

    let start = match sources.since {
        Some(s) => parse_date_input(s, today)?,
        None => match (preset, &sources.env_start, sources.file.and_then(|f| f.start.as_deref())) {
            (Some(p), _, _) => p.start,
            (None, Some(env), _) => parse_date_input(env, today)?,
            (None, None, Some(file)) => parse_date_input(file, today)?,
            (None, None, None) => ymd(DEFAULT_START)?,
        },
    };

    let end = match sources.until {
        Some(u) => parse_date_input(u, today)?,
        None => match (preset, &sources.env_end, sources.file.and_then(|f| f.end.as_deref())) {
            (Some(p), _, _) => p.end,
            (None, Some(env), _) => parse_date_input(env, today)?,
            (None, None, Some(file)) => parse_date_input(file, today)?,
            (None, None, None) => ymd(DEFAULT_END)?,
        },
    };

    DateWindow::new(start, end)
}

/// Named windows: `q1`..`q4` of the current year, `2025-q2`, `ytd`,
/// `last-30-days`, `last-6-weeks`.
pub fn parse_preset(input: &str, today: NaiveDate) -> Result<DateWindow> {
    let preset = input.trim().to_lowercase();

    if preset == "ytd" {
        let start = NaiveDate::from_ymd_opt(today.year(), 1, 1)
            .ok_or_else(|| PulseError::InvalidDate(input.to_string()))?;
        return DateWindow::new(start, today);
    }

    if let Some(rest) = preset.strip_prefix("last-") {
        let (n, unit_days) = if let Some(n) = rest.strip_suffix("-days") {
            (n, 1)
        } else if let Some(n) = rest.strip_suffix("-weeks") {
            (n, 7)
        } else {
            return Err(PulseError::Parse(format!("Unknown preset '{input}'")));
        };
        let n: u64 = n
            .parse()
            .map_err(|_| PulseError::Parse(format!("Unknown preset '{input}'")))?;
        let start = today
            .checked_sub_days(Days::new(n * unit_days))
            .ok_or_else(|| PulseError::InvalidDate(input.to_string()))?;
        return DateWindow::new(start, today);
    }

    let (year, quarter) = match preset.split_once("-q") {
        Some((year, q)) => (
            year.parse::<i32>()
                .map_err(|_| PulseError::Parse(format!("Unknown preset '{input}'")))?,
            q,
        ),
        None => match preset.strip_prefix('q') {
            Some(q) => (today.year(), q),
            None => return Err(PulseError::Parse(format!("Unknown preset '{input}'"))),
        },
    };
    let quarter: u32 = match quarter.parse() {
        Ok(q @ 1..=4) => q,
        _ => return Err(PulseError::Parse(format!("Unknown preset '{input}'"))),
    };
    quarter_window(year, quarter)
}

fn quarter_window(year: i32, quarter: u32) -> Result<DateWindow> {
    let start = NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
        .ok_or_else(|| PulseError::InvalidDate(format!("{year}-q{quarter}")))?;
    let end = start
        .checked_add_months(Months::new(3))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| PulseError::InvalidDate(format!("{year}-q{quarter}")))?;
    DateWindow::new(start, end)
}

/// `YYYY-MM-DD`, RFC3339, "N days/weeks/months ago", or a humantime
/// duration such as `12weeks` meaning that long before `today`.
pub fn parse_date_input(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }

    let ago = parse_natural_duration(input).or_else(|| humantime::parse_duration(input).ok());
    if let Some(duration) = ago {
        let days = duration.as_secs() / 86_400;
        return today
            .checked_sub_days(Days::new(days))
            .ok_or_else(|| PulseError::InvalidDate(format!("Duration overflow for '{input}'")));
    }

    Err(PulseError::InvalidDate(format!("Unrecognized date '{input}'")))
}

fn parse_natural_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();

    if let Some(days) = input.strip_suffix(" days ago") {
        if let Ok(n) = days.trim().parse::<u64>() {
            return Some(Duration::from_secs(n * 86400));
        }
    }

    if let Some(weeks) = input.strip_suffix(" weeks ago") {
        if let Ok(n) = weeks.trim().parse::<u64>() {
            return Some(Duration::from_secs(n * 7 * 86400));
        }
    }

    if let Some(months) = input.strip_suffix(" months ago") {
        if let Ok(n) = months.trim().parse::<u64>() {
            return Some(Duration::from_secs(n * 30 * 86400));
        }
    }

    None
}

fn ymd((y, m, d): (i32, u32, u32)) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| PulseError::InvalidDate(format!("{y}-{m}-{d}")))
}
