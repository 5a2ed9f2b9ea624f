use super::{TeamReport, TeamSeries};
use crate::error::{PulseError, Result};
use crate::model::DateWindow;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};

const SIZE: (u32, u32) = (1500, 800);

const PALETTE: [RGBColor; 6] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
];

fn chart_err<E: std::fmt::Display>(e: E) -> PulseError {
    PulseError::Chart(e.to_string())
}

/// `weekly_commit_trend_<team>.png`, lower-cased with anything outside
/// `[a-z0-9-]` replaced by `_`.
pub fn chart_file_name(team: &str) -> String {
    let slug: String = team
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("weekly_commit_trend_{slug}.png")
}

/// Y axis upper bound with headroom for the "Total" annotations.
fn y_ceiling(totals: &[u32]) -> f64 {
    let max = totals.iter().copied().max().unwrap_or(0) as f64;
    (max * 1.2).max(max + 2.0)
}

/// One line per member across every week, a label on each non-zero point,
/// and a bold "Total: N" above each week that has commits.
pub fn render_team_chart(dir: &Path, series: &TeamSeries, window: &DateWindow) -> Result<PathBuf> {
    let path = dir.join(chart_file_name(&series.team));
    let totals = series.weekly_totals();
    let weeks = totals.len().max(1);

    {
        let root = BitMapBackend::new(&path, SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{window} Weekly Commit Activity - {} Team", series.team),
                ("sans-serif", 28),
            )
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0.5f64..(weeks as f64 + 0.5), 0f64..y_ceiling(&totals))
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .x_labels(weeks)
            .x_label_formatter(&|x| {
                if (x - x.round()).abs() < 1e-6 {
                    format!("Week {}", x.round() as i64)
                } else {
                    String::new()
                }
            })
            .y_label_formatter(&|y| format!("{y:.0}"))
            .x_desc("Week")
            .y_desc("Number of Commits")
            .light_line_style(TRANSPARENT)
            .bold_line_style(BLACK.mix(0.15))
            .draw()
            .map_err(chart_err)?;

        for (i, member) in series.members.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let points: Vec<(f64, f64)> = member
                .counts
                .iter()
                .enumerate()
                .map(|(w, c)| ((w + 1) as f64, f64::from(*c)))
                .collect();

            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
                .map_err(chart_err)?
                .label(member.name.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, 5, color.filled())))
                .map_err(chart_err)?;

            chart
                .draw_series(points.iter().filter(|(_, y)| *y > 0.0).map(|&(x, y)| {
                    Text::new(
                        format!("{}", y as u32),
                        (x, y + 0.2),
                        ("sans-serif", 13)
                            .into_font()
                            .color(&BLACK)
                            .pos(Pos::new(HPos::Center, VPos::Bottom)),
                    )
                }))
                .map_err(chart_err)?;
        }

        chart
            .draw_series(totals.iter().enumerate().filter(|(_, t)| **t > 0).map(|(w, t)| {
                Text::new(
                    format!("Total: {t}"),
                    ((w + 1) as f64, f64::from(*t) + 0.5),
                    ("sans-serif", 15)
                        .into_font()
                        .style(FontStyle::Bold)
                        .color(&BLACK)
                        .pos(Pos::new(HPos::Center, VPos::Bottom)),
                )
            }))
            .map_err(chart_err)?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }

    Ok(path)
}

/// Render every team. A team whose chart fails is logged and skipped.
pub fn render_all(dir: &Path, report: &TeamReport) -> Vec<PathBuf> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        log::warn!("Cannot create {}: {e}", dir.display());
        return Vec::new();
    }

    report
        .team_series
        .iter()
        .filter_map(|series| match render_team_chart(dir, series, &report.window) {
            Ok(path) => {
                log::info!("Generated commit trend chart for {}: {}", series.team, path.display());
                Some(path)
            }
            Err(e) => {
                log::warn!("Chart for {} team failed: {e}", series.team);
                None
            }
        })
        .collect()
}
