use super::ExportError;
use crate::buckets::MONTH_NAMES;
use crate::hr_check::HeartRateReport;
use crate::insights::sport_emoji;
use crate::records::RaceRecord;
use crate::year_stats::{YearComparison, YearStats};
use colored::*;
use std::fmt::Write as _;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct SportRow {
    #[tabled(rename = "Sport")]
    sport: String,
    #[tabled(rename = "Count")]
    count: u32,
    #[tabled(rename = "Distance (km)")]
    distance: String,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "Elevation (m)")]
    elevation: String,
    #[tabled(rename = "Best")]
    best: String,
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Activities")]
    activities: u32,
    #[tabled(rename = "Distance (km)")]
    distance: String,
    #[tabled(rename = "Hours")]
    hours: String,
}

#[derive(Tabled)]
struct HeartRateRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Activity")]
    name: String,
    #[tabled(rename = "Max HR")]
    max: String,
    #[tabled(rename = "Avg HR")]
    avg: String,
}

/// Format a pace in min/km as `m:ss`
pub fn format_pace(pace: f64) -> String {
    let total_seconds = (pace * 60.0).round() as u64;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Format seconds as `h:mm:ss`, or `mm:ss` under an hour
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

fn heading(text: &str, color: bool) -> String {
    if color {
        text.cyan().bold().to_string()
    } else {
        text.to_string()
    }
}

fn highlight(text: String, color: bool) -> String {
    if color {
        text.yellow().to_string()
    } else {
        text
    }
}

fn race_line(label: &str, record: &Option<RaceRecord>) -> Option<String> {
    record.as_ref().map(|r| {
        format!(
            "  {:<16} {} ({})",
            label,
            format_duration(r.time),
            r.date.format("%Y-%m-%d")
        )
    })
}

/// Render a year summary as a human readable report
pub fn render_report(
    stats: &YearStats,
    comparison: Option<&YearComparison>,
    color: bool,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", heading(&format!("YOUR {} IN SPORT", stats.year), color));
    let _ = writeln!(out);
    let _ = writeln!(out, "Activities:  {}", highlight(stats.total_activities.to_string(), color));
    let _ = writeln!(out, "Distance:    {:.1} km", stats.total_distance);
    let _ = writeln!(out, "Time:        {:.1} h", stats.total_duration);
    let _ = writeln!(out, "Elevation:   {:.0} m", stats.total_elevation);
    let _ = writeln!(out, "Calories:    {:.0} kcal", stats.total_calories);
    let _ = writeln!(out, "Active days: {}", stats.active_days);
    let _ = writeln!(out);

    if !stats.by_sport.is_empty() {
        let rows: Vec<SportRow> = stats
            .by_sport
            .values()
            .map(|sport| SportRow {
                sport: format!("{} {}", sport_emoji(sport.category), sport.category),
                count: sport.count,
                distance: format!("{:.1}", sport.total_distance),
                hours: format!("{:.1}", sport.total_duration),
                elevation: format!("{:.0}", sport.total_elevation),
                best: match (sport.best_pace, sport.best_speed) {
                    (Some(pace), _) if sport.category.uses_pace() => {
                        format!("{} /km", format_pace(pace))
                    }
                    (_, Some(speed)) => format!("{:.1} km/h", speed),
                    _ => "-".to_string(),
                },
            })
            .collect();
        let _ = writeln!(out, "{}", heading("SPORTS", color));
        let _ = writeln!(out, "{}", Table::new(rows).with(Style::rounded()));
        let _ = writeln!(out);
    }

    let records = &stats.records;
    let race_lines: Vec<String> = [
        race_line("5K", &records.fastest_5k),
        race_line("10K", &records.fastest_10k),
        race_line("Half marathon", &records.fastest_half_marathon),
        race_line("Marathon", &records.fastest_marathon),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !race_lines.is_empty() || records.longest_streak > 0 {
        let _ = writeln!(out, "{}", heading("PERSONAL RECORDS", color));
        for line in race_lines {
            let _ = writeln!(out, "{}", line);
        }
        if let Some(run) = &records.longest_run {
            let _ = writeln!(out, "  {:<16} {:.1} km", "Longest run", run.distance_km);
        }
        if let Some(ride) = &records.longest_ride {
            let _ = writeln!(out, "  {:<16} {:.1} km", "Longest ride", ride.distance_km);
        }
        if let Some(hr) = &records.highest_heart_rate {
            let _ = writeln!(out, "  {:<16} {:.0} bpm", "Highest HR", hr.value);
        }
        let _ = writeln!(out, "  {:<16} {} days", "Longest streak", records.longest_streak);
        let _ = writeln!(out);
    }

    if stats.total_activities > 0 {
        let rows: Vec<MonthRow> = stats
            .monthly
            .iter()
            .map(|m| MonthRow {
                month: MONTH_NAMES[(m.month - 1) as usize].to_string(),
                activities: m.activities,
                distance: format!("{:.1}", m.distance),
                hours: format!("{:.1}", m.duration),
            })
            .collect();
        let _ = writeln!(out, "{}", heading("MONTHS", color));
        let _ = writeln!(out, "{}", Table::new(rows).with(Style::rounded()));
        let _ = writeln!(out);
    }

    if let Some(patterns) = &stats.training_patterns {
        let _ = writeln!(out, "{}", heading("TRAINING PATTERNS", color));
        let _ = writeln!(out, "  Personality:     {}", patterns.training_personality.title());
        let _ = writeln!(out, "  Preferred time:  {}", patterns.preferred_time_of_day);
        let _ = writeln!(out, "  Peak hour:       {:02}:00", patterns.most_active_hour);
        let _ = writeln!(out, "  Consistency:     {}/100", patterns.consistency);
        let _ = writeln!(out);
    }

    if let Some(epic) = &stats.epic_moment {
        let _ = writeln!(out, "{}", heading("EPIC MOMENT", color));
        let _ = writeln!(
            out,
            "  {} {}: {} ({:.1} km, {})",
            epic.emoji,
            epic.reason,
            epic.activity.name,
            epic.activity.distance_km,
            epic.activity.start_time.format("%Y-%m-%d")
        );
        if let Some(text) = &epic.comparison_text {
            let _ = writeln!(out, "  {}", text);
        }
        let _ = writeln!(out);
    }

    if !stats.insights.is_empty() {
        let _ = writeln!(out, "{}", heading("INSIGHTS", color));
        for insight in &stats.insights {
            let _ = writeln!(
                out,
                "  {} {}: {}",
                insight.icon,
                insight.title,
                highlight(insight.value.clone(), color)
            );
            let _ = writeln!(out, "     {}", insight.description);
        }
        let _ = writeln!(out);
    }

    if let Some(achievements) = stats.achievements.as_ref().filter(|a| a.has_badges) {
        let _ = writeln!(
            out,
            "{}",
            heading(&format!("BADGES ({})", achievements.total_badges), color)
        );
        for badge in &achievements.badges {
            let _ = writeln!(out, "  {} {} - {}", badge.emoji, badge.name, badge.description);
        }
        let _ = writeln!(out);
    }

    if let Some(wellness) = &stats.wellness {
        let _ = writeln!(out, "{}", heading("WELLNESS", color));
        if wellness.has_steps_data {
            let _ = writeln!(
                out,
                "  Steps: {} per day, best month {}",
                wellness.avg_daily_steps, wellness.best_month.name
            );
        }
        if wellness.has_sleep_data {
            if let Some(score) = wellness.avg_sleep_score {
                let _ = writeln!(
                    out,
                    "  Sleep score: {:.0} ({} excellent nights)",
                    score, wellness.excellent_sleep_days
                );
            }
        }
        if wellness.has_hrv_data {
            if let Some(hrv) = wellness.avg_hrv {
                let trend = wellness
                    .hrv_trend
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let _ = writeln!(out, "  HRV: {:.0} ms ({})", hrv, trend);
            }
        }
        let _ = writeln!(out);
    }

    if let Some(comparison) = comparison {
        let _ = writeln!(
            out,
            "{}",
            heading(&format!("{} VS {}", comparison.year, comparison.previous_year), color)
        );
        for metric in &comparison.metrics {
            let change = metric
                .change_percent
                .map(|pct| format!("{:+.0}%", pct))
                .unwrap_or_else(|| "new".to_string());
            let _ = writeln!(
                out,
                "  {:<11} {:>10.1} {:<2} (was {:.1}, {})",
                metric.label, metric.current, metric.unit, metric.previous, change
            );
        }
        let _ = writeln!(out);
    }

    let diagnostics = &stats.diagnostics;
    if !diagnostics.unknown_activity_types.is_empty() || !diagnostics.row_errors.is_empty() {
        let _ = writeln!(out, "{}", heading("DIAGNOSTICS", color));
        if !diagnostics.unknown_activity_types.is_empty() {
            let _ = writeln!(
                out,
                "  Counted as other: {}",
                diagnostics.unknown_activity_types.join(", ")
            );
        }
        for error in &diagnostics.row_errors {
            let _ = writeln!(out, "  Skipped {}", error);
        }
    }

    out
}

/// Render the heart-rate sanity check
pub fn render_heart_rate_report(report: &HeartRateReport, color: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", heading("HEART RATE CHECK", color));
    let _ = writeln!(
        out,
        "{} of {} activities recorded a maximum heart rate",
        report.activities_with_hr, report.total_activities
    );
    if let Some(avg) = report.overall_avg_training_hr {
        let _ = writeln!(out, "Average training heart rate: {:.0} bpm", avg);
    }

    if !report.top_max_hr.is_empty() {
        let rows: Vec<HeartRateRow> = report
            .top_max_hr
            .iter()
            .map(|entry| HeartRateRow {
                date: entry.date.format("%Y-%m-%d").to_string(),
                name: entry.name.clone(),
                max: format!("{:.0}", entry.max_heart_rate),
                avg: entry
                    .avg_heart_rate
                    .map(|hr| format!("{:.0}", hr))
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        let _ = writeln!(out, "{}", Table::new(rows).with(Style::rounded()));
    }

    let summary = format!(
        "{} suspicious readings above {:.0} bpm",
        report.suspicious_count(),
        crate::hr_check::SUSPICIOUS_HEART_RATE
    );
    if color && report.suspicious_count() > 0 {
        let _ = writeln!(out, "{}", summary.red().bold());
    } else {
        let _ = writeln!(out, "{}", summary);
    }

    out
}

/// Export a year summary to a plain text file
pub fn export_text_report<P: AsRef<Path>>(
    stats: &YearStats,
    comparison: Option<&YearComparison>,
    output_path: P,
) -> Result<(), ExportError> {
    std::fs::write(output_path, render_report(stats, comparison, false))?;
    Ok(())
}
