//! History command implementation.

use anyhow::Result;
use serde::Serialize;

use gasoo_core::{ReadingService, ReadingSource};
use gasoo_types::usage::{average_daily_usage, usage_samples};
use gasoo_types::{Reading, UsageSample};

use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, format_readings_csv, format_readings_text, format_usage_text, to_json,
};

#[derive(Debug, Serialize)]
struct HistoryOutput<'a> {
    readings: &'a [Reading],
    usage: &'a [UsageSample],
    average_daily_usage: f64,
}

/// Print recent readings and the per-day usage derived from them.
pub async fn cmd_history<S: ReadingSource>(
    service: &ReadingService<S>,
    tank_capacity: f64,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<String> {
    let readings = service.get_readings().await;
    if service.is_degraded() {
        eprintln!("Reading source unreachable; showing locally buffered readings.");
    }

    let usage = usage_samples(&readings, tank_capacity);
    let average = average_daily_usage(&usage);

    let content = match format {
        OutputFormat::Text => {
            let mut out = format_readings_text(&readings, opts);
            out.push('\n');
            out.push_str(&format_usage_text(&usage, average));
            out
        }
        OutputFormat::Json => {
            to_json(&HistoryOutput {
                readings: &readings,
                usage: &usage,
                average_daily_usage: average,
            })? + "\n"
        }
        OutputFormat::Csv => format_readings_csv(&readings),
    };
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasoo_core::{DegradedPolicy, LocalSource};
    use gasoo_store::MemoryStore;
    use time::macros::datetime;

    fn service(store: MemoryStore) -> ReadingService<LocalSource<MemoryStore>> {
        ReadingService::new(LocalSource::new(store), DegradedPolicy::Empty)
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_at(50.0, datetime!(2026-10-13 08:00 UTC)).unwrap();
        store.insert_at(46.0, datetime!(2026-10-14 08:00 UTC)).unwrap();
        store.insert_at(44.0, datetime!(2026-10-14 18:00 UTC)).unwrap();
        store
    }

    #[tokio::test]
    async fn test_history_json() {
        let out = cmd_history(
            &service(seeded_store()),
            100.0,
            OutputFormat::Json,
            &FormatOptions::default(),
        )
        .await
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["readings"].as_array().unwrap().len(), 3);
        assert_eq!(json["readings"][0]["level"], 44.0);
        assert_eq!(json["usage"][0]["date"], "Oct 13");
        assert_eq!(json["usage"][1]["usage"], 6.0);
        assert_eq!(json["average_daily_usage"], 3.0);
    }

    #[tokio::test]
    async fn test_history_csv() {
        let out = cmd_history(
            &service(seeded_store()),
            100.0,
            OutputFormat::Csv,
            &FormatOptions::default(),
        )
        .await
        .unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "id,level,timestamp");
        assert!(lines[1].starts_with("3,44,"));
    }

    #[tokio::test]
    async fn test_history_empty_text() {
        let out = cmd_history(
            &service(MemoryStore::new()),
            100.0,
            OutputFormat::Text,
            &FormatOptions::new(true),
        )
        .await
        .unwrap();

        assert!(out.contains("No readings."));
        assert!(out.contains("No usage history."));
    }
}
