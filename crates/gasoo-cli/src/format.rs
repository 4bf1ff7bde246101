//! Output formatting for text, JSON, and CSV output.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use gasoo_core::{DashboardSnapshot, ValveStatus};
use gasoo_types::usage::UNLIMITED_DAYS;
use gasoo_types::{LevelStatus, Reading, UsageSample};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }
}

/// Serialize any value as pretty JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// Format the status badge, colored by severity.
pub fn format_status(status: LevelStatus, opts: &FormatOptions) -> String {
    let label = status.to_string();
    if opts.no_color {
        return label;
    }
    match status {
        LevelStatus::Optimal => label.green().to_string(),
        LevelStatus::Adequate => label.yellow().to_string(),
        LevelStatus::Low => label.red().bold().to_string(),
    }
}

/// Format a days-remaining figure; the sentinel reads as "unlimited".
pub fn format_days_remaining(days: f64) -> String {
    if days >= UNLIMITED_DAYS {
        "unlimited (not enough usage history)".to_string()
    } else {
        format!("{:.1} days", days)
    }
}

/// Format usage history as a single line of `"date value"` pairs.
pub fn format_usage_line(usage: &[UsageSample]) -> String {
    if usage.is_empty() {
        return "no usage recorded".to_string();
    }
    usage
        .iter()
        .map(|s| format!("{} {:.1}", s.date, s.usage))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Multi-line dashboard view of one snapshot.
pub fn format_snapshot_text(snapshot: &DashboardSnapshot, opts: &FormatOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Level:          {:.1}%  [{}]\n",
        snapshot.level,
        format_status(snapshot.status, opts)
    ));
    out.push_str(&format!(
        "Daily usage:    {:.1} units/day\n",
        snapshot.average_daily_usage
    ));
    out.push_str(&format!(
        "Days remaining: {}\n",
        format_days_remaining(snapshot.days_remaining)
    ));
    out.push_str(&format!(
        "Usage:          {}\n",
        format_usage_line(&snapshot.usage)
    ));
    out.push_str(&format!(
        "Updated:        {}\n",
        format_timestamp(snapshot.updated_at)
    ));
    if snapshot.degraded {
        let note = "Source unreachable: showing fallback data";
        if opts.no_color {
            out.push_str(note);
        } else {
            out.push_str(&note.yellow().to_string());
        }
        out.push('\n');
    }
    out
}

/// One-line view of a snapshot, used by `watch`.
pub fn format_snapshot_line(snapshot: &DashboardSnapshot, opts: &FormatOptions) -> String {
    let mut line = format!(
        "[{}] {:.1}% {} | {:.1}/day | {}",
        format_timestamp(snapshot.updated_at),
        snapshot.level,
        format_status(snapshot.status, opts),
        snapshot.average_daily_usage,
        format_days_remaining(snapshot.days_remaining)
    );
    if snapshot.degraded {
        line.push_str(" (offline)");
    }
    line
}

/// Single-line CSV row for a snapshot.
pub fn format_snapshot_csv(snapshot: &DashboardSnapshot, header: bool) -> String {
    let mut out = String::new();
    if header {
        out.push_str("timestamp,level,status,average_daily_usage,days_remaining,degraded\n");
    }
    out.push_str(&format!(
        "{},{:.1},{},{:.1},{:.1},{}\n",
        format_timestamp(snapshot.updated_at),
        snapshot.level,
        snapshot.status,
        snapshot.average_daily_usage,
        snapshot.days_remaining,
        snapshot.degraded
    ));
    out
}

/// Table of readings, newest first.
pub fn format_readings_text(readings: &[Reading], opts: &FormatOptions) -> String {
    if readings.is_empty() {
        return "No readings.\n".to_string();
    }

    let mut out = format!("{:>6}  {:<19}  {:>7}  {}\n", "ID", "Time", "Level", "Status");
    for r in readings {
        out.push_str(&format!(
            "{:>6}  {:<19}  {:>6.1}%  {}\n",
            r.id,
            format_timestamp(r.timestamp),
            r.level,
            format_status(r.status(), opts)
        ));
    }
    out
}

/// Readings as CSV.
pub fn format_readings_csv(readings: &[Reading]) -> String {
    let mut out = String::from("id,level,timestamp\n");
    for r in readings {
        out.push_str(&format!(
            "{},{},{}\n",
            r.id,
            r.level,
            format_timestamp(r.timestamp)
        ));
    }
    out
}

/// Per-day usage as an aligned list.
pub fn format_usage_text(usage: &[UsageSample], average: f64) -> String {
    if usage.is_empty() {
        return "No usage history.\n".to_string();
    }

    let mut out = String::new();
    for s in usage {
        out.push_str(&format!("{:<8} {:>6.1}\n", s.date, s.usage));
    }
    out.push_str(&format!("{:<8} {:>6.1}\n", "Average", average));
    out
}

/// Valve position for display.
pub fn format_valve_text(status: &ValveStatus, opts: &FormatOptions) -> String {
    let state = if opts.no_color {
        status.state.to_string()
    } else if status.state.is_open() {
        status.state.to_string().green().to_string()
    } else {
        status.state.to_string().red().to_string()
    };

    match status.changed_at {
        Some(ts) => format!("Valve: {} (since {})", state, format_timestamp(ts)),
        None => format!("Valve: {}", state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasoo_types::ValveState;
    use time::macros::datetime;

    fn plain() -> FormatOptions {
        FormatOptions::new(true)
    }

    fn snapshot(degraded: bool, days_remaining: f64) -> DashboardSnapshot {
        DashboardSnapshot {
            level: 62.0,
            status: LevelStatus::Adequate,
            usage: vec![
                UsageSample::new("Oct 13", 10.0),
                UsageSample::new("Oct 14", 10.0),
            ],
            average_daily_usage: 10.0,
            days_remaining,
            degraded,
            updated_at: datetime!(2026-10-14 08:30:00 UTC),
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(datetime!(2026-10-14 08:30:05 UTC)),
            "2026-10-14 08:30:05"
        );
    }

    #[test]
    fn test_format_status_plain() {
        assert_eq!(format_status(LevelStatus::Low, &plain()), "Low");
    }

    #[test]
    fn test_format_status_colored_contains_label() {
        let colored = format_status(LevelStatus::Optimal, &FormatOptions::new(false));
        assert!(colored.contains("Optimal"));
        assert_ne!(colored, "Optimal");
    }

    #[test]
    fn test_format_days_remaining() {
        assert_eq!(format_days_remaining(6.2), "6.2 days");
        assert_eq!(format_days_remaining(0.0), "0.0 days");
        assert!(format_days_remaining(UNLIMITED_DAYS).starts_with("unlimited"));
    }

    #[test]
    fn test_format_snapshot_text() {
        let text = format_snapshot_text(&snapshot(false, 6.2), &plain());
        assert!(text.contains("Level:          62.0%  [Adequate]"));
        assert!(text.contains("Daily usage:    10.0 units/day"));
        assert!(text.contains("Days remaining: 6.2 days"));
        assert!(text.contains("Oct 13 10.0 | Oct 14 10.0"));
        assert!(!text.contains("unreachable"));
    }

    #[test]
    fn test_format_snapshot_text_degraded() {
        let text = format_snapshot_text(&snapshot(true, UNLIMITED_DAYS), &plain());
        assert!(text.contains("unlimited"));
        assert!(text.contains("Source unreachable"));
    }

    #[test]
    fn test_format_snapshot_line() {
        let line = format_snapshot_line(&snapshot(true, 6.2), &plain());
        assert_eq!(
            line,
            "[2026-10-14 08:30:00] 62.0% Adequate | 10.0/day | 6.2 days (offline)"
        );
    }

    #[test]
    fn test_format_snapshot_csv() {
        let csv = format_snapshot_csv(&snapshot(false, 6.2), true);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("timestamp,level"));
        assert_eq!(lines[1], "2026-10-14 08:30:00,62.0,Adequate,10.0,6.2,false");
    }

    #[test]
    fn test_format_readings() {
        let readings = vec![Reading {
            id: 3,
            level: 35.5,
            timestamp: datetime!(2026-10-14 08:00:00 UTC),
        }];

        let text = format_readings_text(&readings, &plain());
        assert!(text.contains("35.5%"));
        assert!(text.contains("Low"));

        let csv = format_readings_csv(&readings);
        assert_eq!(csv, "id,level,timestamp\n3,35.5,2026-10-14 08:00:00\n");

        assert_eq!(format_readings_text(&[], &plain()), "No readings.\n");
    }

    #[test]
    fn test_format_usage_text() {
        let usage = vec![UsageSample::new("Oct 14", 4.5)];
        let text = format_usage_text(&usage, 4.5);
        assert!(text.contains("Oct 14      4.5"));
        assert!(text.contains("Average     4.5"));
    }

    #[test]
    fn test_format_valve_text() {
        let status = ValveStatus {
            state: ValveState::Closed,
            changed_at: Some(datetime!(2026-10-14 09:00:00 UTC)),
        };
        assert_eq!(
            format_valve_text(&status, &plain()),
            "Valve: Closed (since 2026-10-14 09:00:00)"
        );
    }

    #[test]
    fn test_to_json_snapshot() {
        let json = to_json(&snapshot(false, 6.2)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["level"], 62.0);
        assert_eq!(value["status"], "Adequate");
        assert_eq!(value["usage"][0]["date"], "Oct 13");
    }
}
