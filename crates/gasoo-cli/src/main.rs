//! Gasoo - terminal dashboard for a gas cylinder.

use std::io;

use anyhow::{Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gasoo_core::{
    Dashboard, DashboardConfig, LocalSource, ReadingService, ReadingSource, ServiceClient,
};
use gasoo_store::Store;

mod cli;
mod commands;
mod format;

use cli::{Cli, Commands};
use commands::{WatchArgs, cmd_add, cmd_history, cmd_status, cmd_valve, cmd_watch};
use format::FormatOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let opts = FormatOptions::new(cli.no_color);

    if !cli.source.capacity.is_finite() || cli.source.capacity <= 0.0 {
        bail!("--capacity must be a positive number, got {}", cli.source.capacity);
    }

    // The valve lives on the API only.
    if let Commands::Valve { state, yes } = cli.command {
        if cli.source.database.is_some() {
            bail!("The valve can only be controlled through the API; drop --database.");
        }
        let client = ServiceClient::new(&cli.source.api_url)?;
        print!("{}", cmd_valve(&client, state, yes, &opts).await?);
        return Ok(());
    }

    match cli.source.database.clone() {
        Some(path) => {
            tracing::debug!("Reading from local database {}", path.display());
            let store = Store::open(&path)?;
            run(&cli, LocalSource::new(store), &opts).await
        }
        None => {
            tracing::debug!("Reading from API at {}", cli.source.api_url);
            let client = ServiceClient::new(&cli.source.api_url)?;
            run(&cli, client, &opts).await
        }
    }
}

async fn run<S: ReadingSource + 'static>(cli: &Cli, source: S, opts: &FormatOptions) -> Result<()> {
    let service = ReadingService::new(source, cli.source.degraded.into());
    let config = DashboardConfig {
        tank_capacity: cli.source.capacity,
        ..DashboardConfig::default()
    };

    match &cli.command {
        Commands::Status { format } => {
            let mut dashboard = Dashboard::new(service, config);
            print!("{}", cmd_status(&mut dashboard, *format, opts).await?);
        }
        Commands::Watch {
            interval,
            count,
            format,
        } => {
            let dashboard = Dashboard::new(service, config);
            let args = WatchArgs {
                interval: *interval,
                count: *count,
                format: *format,
                opts,
            };
            cmd_watch(dashboard, args, &mut io::stdout()).await?;
        }
        Commands::History { limit, format } => {
            let service = service.with_history_limit(*limit);
            print!(
                "{}",
                cmd_history(&service, cli.source.capacity, *format, opts).await?
            );
        }
        Commands::Add { level } => {
            print!("{}", cmd_add(&service, *level).await?);
        }
        Commands::Valve { .. } => unreachable!("handled before a source is opened"),
    }

    Ok(())
}
