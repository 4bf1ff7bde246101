//! Watch command implementation.
//!
//! Runs the dashboard poller and prints every snapshot it publishes until
//! the requested count is reached or Ctrl+C is pressed.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;

use gasoo_core::{Dashboard, DashboardPoller, DashboardSnapshot, ReadingSource};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_snapshot_csv, format_snapshot_line};

/// Arguments for the watch command.
pub struct WatchArgs<'a> {
    pub interval: u64,
    pub count: u32,
    pub format: OutputFormat,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_watch<S, W>(dashboard: Dashboard<S>, args: WatchArgs<'_>, out: &mut W) -> Result<()>
where
    S: ReadingSource + 'static,
    W: Write,
{
    let WatchArgs {
        interval,
        count,
        format,
        opts,
    } = args;

    let poller = DashboardPoller::spawn(dashboard, Duration::from_secs(interval.max(1)));
    let mut rx = poller.subscribe();
    let mut shown: u32 = 0;

    if count > 0 {
        eprintln!("Interval: {}s | Count: {} | Press Ctrl+C to stop", interval, count);
    } else {
        eprintln!("Interval: {}s | Press Ctrl+C to stop", interval);
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nShutting down...");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                let Some(snapshot) = snapshot else { continue };

                let line = render(&snapshot, format, opts, shown == 0)?;
                out.write_all(line.as_bytes())?;
                out.flush()?;

                shown += 1;
                if count > 0 && shown >= count {
                    break;
                }
            }
        }
    }

    // An in-flight refresh is allowed to finish.
    poller.join().await?;
    Ok(())
}

fn render(
    snapshot: &DashboardSnapshot,
    format: OutputFormat,
    opts: &FormatOptions,
    first: bool,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format_snapshot_line(snapshot, opts) + "\n",
        OutputFormat::Json => serde_json::to_string(snapshot)? + "\n",
        OutputFormat::Csv => format_snapshot_csv(snapshot, first),
    })
}
