//! timetally - monthly budget and utilization reports from Harvest-style
//! time tracking data
//!
//! This library provides functionality to:
//! - Fetch time entries, projects, and clients from a Harvest-shaped API
//! - Consolidate raw records into configured target groups by keyword
//! - Roll grouped entries up into budget/utilization figures per month
//! - Render the result as a terminal table, JSON, or a self-contained HTML
//!   document for email delivery
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use timetally::{
//!     config::{Credentials, ReportConfig},
//!     harvest::HarvestClient,
//!     report::ReportAssembler,
//! };
//!
//! #[tokio::main]
//! async fn main() -> timetally::Result<()> {
//!     let credentials = Credentials::ensure(
//!         std::env::var("HARVEST_ACCOUNT_ID").ok(),
//!         std::env::var("HARVEST_TOKEN").ok(),
//!     )?;
//!     let client = HarvestClient::new(credentials)?;
//!     let config = ReportConfig::load("config.toml")?;
//!
//!     let assembler = ReportAssembler::new(Arc::new(client), config);
//!     let report = assembler.build_report(Some("2024-01".parse()?), None).await?;
//!     println!("{} hours in {}", report.total_hours, report.label);
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod categorize;
pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod harvest;
pub mod html;
pub mod output;
pub mod report;
pub mod schedule;
pub mod types;

// Re-export commonly used types
pub use error::{Result, TallyError};
pub use report::{Report, ReportAssembler};
pub use types::{ClientId, ProjectId, ReportMonth};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
