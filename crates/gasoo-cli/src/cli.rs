//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use gasoo_core::{DEFAULT_API_URL, DEFAULT_REFRESH_SECS, DegradedPolicy};
use gasoo_types::{DEFAULT_TANK_CAPACITY, ValveState};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Degraded-mode policy as a command-line value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Show nothing while the source is unreachable
    Empty,
    /// Show locally buffered and placeholder data (default)
    #[default]
    Placeholder,
}

impl From<PolicyArg> for DegradedPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Empty => DegradedPolicy::Empty,
            PolicyArg::Placeholder => DegradedPolicy::Placeholder,
        }
    }
}

/// Where readings come from
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Base URL of the Gasoo API
    #[arg(long, global = true, env = "GASOO_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Read a local SQLite database instead of the API (takes precedence over --api-url)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// What to show when the source is unreachable
    #[arg(long, global = true, value_enum, default_value = "placeholder")]
    pub degraded: PolicyArg,

    /// Tank units represented by a full (100%) cylinder
    #[arg(long, global = true, default_value_t = DEFAULT_TANK_CAPACITY)]
    pub capacity: f64,
}

#[derive(Parser)]
#[command(name = "gasoo")]
#[command(author, version, about = "Gas-cylinder level dashboard", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current level, usage and days remaining
    Status {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Refresh the dashboard on an interval
    Watch {
        /// Refresh interval in seconds
        #[arg(short, long, default_value_t = DEFAULT_REFRESH_SECS)]
        interval: u64,

        /// Stop after this many refreshes (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u32,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List recent readings and per-day usage
    History {
        /// Number of readings to fetch
        #[arg(short, long, default_value = "30")]
        limit: u32,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Record a reading
    Add {
        /// Fill level in percent (0-100)
        #[arg(allow_negative_numbers = true)]
        level: f64,
    },

    /// Show or switch the remote valve
    Valve {
        /// New valve position (open or closed); omit to show the current one
        state: Option<ValveState>,

        /// Confirm closing the valve
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["gasoo", "status"]).unwrap();
        assert_eq!(cli.source.degraded, PolicyArg::Placeholder);
        assert_eq!(cli.source.capacity, 100.0);
        assert!(cli.source.database.is_none());
        assert!(matches!(
            cli.command,
            Commands::Status {
                format: OutputFormat::Text
            }
        ));
    }

    #[test]
    fn test_database_source() {
        let cli = Cli::try_parse_from(["gasoo", "history", "--database", "/tmp/readings.db", "-l", "5"])
            .unwrap();
        assert_eq!(cli.source.database, Some(PathBuf::from("/tmp/readings.db")));
        assert!(matches!(cli.command, Commands::History { limit: 5, .. }));
    }

    #[test]
    fn test_valve_state_argument() {
        let cli = Cli::try_parse_from(["gasoo", "valve", "closed", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Valve {
                state: Some(ValveState::Closed),
                yes: true
            }
        ));

        assert!(Cli::try_parse_from(["gasoo", "valve", "sideways"]).is_err());
    }

    #[test]
    fn test_add_requires_level() {
        assert!(Cli::try_parse_from(["gasoo", "add"]).is_err());
        let cli = Cli::try_parse_from(["gasoo", "add", "41.5"]).unwrap();
        assert!(matches!(cli.command, Commands::Add { level } if level == 41.5));
    }

    #[test]
    fn test_policy_conversion() {
        assert_eq!(DegradedPolicy::from(PolicyArg::Empty), DegradedPolicy::Empty);
        assert_eq!(
            DegradedPolicy::from(PolicyArg::Placeholder),
            DegradedPolicy::Placeholder
        );
    }
}
