//! Status command implementation.

use anyhow::Result;

use gasoo_core::{Dashboard, ReadingSource};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_snapshot_csv, format_snapshot_text, to_json};

/// Refresh once and print the dashboard.
pub async fn cmd_status<S: ReadingSource>(
    dashboard: &mut Dashboard<S>,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<String> {
    let snapshot = dashboard.refresh().await;

    let content = match format {
        OutputFormat::Text => format_snapshot_text(&snapshot, opts),
        OutputFormat::Json => to_json(&snapshot)? + "\n",
        OutputFormat::Csv => format_snapshot_csv(&snapshot, true),
    };
    Ok(content)
}
