//! CLI interface for timetally
//!
//! This module defines the command-line interface using clap. Credentials
//! come from flags or the environment; the target-group configuration comes
//! from a TOML file (`--config`, falling back to the per-user config
//! directory).
//!
//! # Example
//!
//! ```bash
//! # This month's report as a table
//! timetally report
//!
//! # A historical month as JSON, restricted to one person's entries
//! timetally report --month 2024-01 --user kim --json
//!
//! # Weekly HTML reports written to ./reports
//! timetally schedule --out-dir reports
//! ```

use crate::error::Result;
use crate::types::ReportMonth;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Monthly budget and utilization reports from time tracking data
#[derive(Parser, Debug, Clone)]
#[command(name = "timetally")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the report configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Provider account id
    #[arg(long, env = "HARVEST_ACCOUNT_ID", global = true, hide_env_values = true)]
    pub account_id: Option<String>,

    /// Provider access token
    #[arg(long, env = "HARVEST_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the monthly budget report
    Report {
        /// Month to report on (YYYY-MM, defaults to the current month)
        #[arg(long)]
        month: Option<String>,

        /// Only count entries whose user name contains this text
        #[arg(long, short = 'u')]
        user: Option<String>,
    },

    /// Render the monthly report as a self-contained HTML document
    Html {
        /// Month to report on (YYYY-MM, defaults to the current month)
        #[arg(long)]
        month: Option<String>,

        /// File the document is written to
        #[arg(long, short = 'o')]
        out: PathBuf,
    },

    /// Run the periodic report loop, delivering HTML reports to a directory
    Schedule {
        /// Interval between reports in hours
        #[arg(long, default_value = "168")]
        every_hours: u64,

        /// Directory rendered reports are written to
        #[arg(long, default_value = "reports")]
        out_dir: PathBuf,
    },

    /// Verify the configured credentials against the provider
    Check,
}

/// Parse an optional month selector, failing fast on malformed input
pub fn parse_month(month: Option<&str>) -> Result<Option<ReportMonth>> {
    month.map(str::parse).transpose()
}
