//! Core domain types for timetally
//!
//! This module contains the fundamental types used throughout the timetally
//! library: strongly-typed provider ids, the wire shapes returned by the
//! time tracking API, and the month selector used to bound a report.

use crate::error::{Result, TallyError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strongly-typed project id
///
/// Project ids are opaque integers assigned by the provider; wrapping them
/// keeps project and client ids from being mixed up in routing maps.
///
/// # Examples
/// ```
/// use timetally::types::ProjectId;
///
/// let id = ProjectId::new(14307453);
/// assert_eq!(id.value(), 14307453);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(u64);

impl ProjectId {
    /// Create a new ProjectId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly-typed client id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(u64);

impl ClientId {
    /// Create a new ClientId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Project reference embedded in a time entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: ProjectId,
    pub name: String,
}

/// Client reference embedded in a time entry or project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: ClientId,
    pub name: String,
}

/// User reference embedded in a time entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: u64,
    pub name: String,
}

/// A single tracked time entry as returned by the provider
///
/// Entries are read-only input to the report engine; they are fetched fresh
/// for every report build and never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    /// Calendar date the hours were logged against
    pub spent_date: NaiveDate,
    pub hours: f64,
    pub billable: bool,
    /// Rate the provider bills this entry at, when set
    #[serde(default)]
    pub billable_rate: Option<f64>,
    /// Rate fallback some provider configurations report instead
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    pub project: ProjectRef,
    /// Present when the provider could resolve the owning client
    #[serde(default)]
    pub client: Option<ClientRef>,
    #[serde(default)]
    pub user: Option<UserRef>,
}

/// A project record as returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// 0 or absent means no budget set
    #[serde(default)]
    pub budget: Option<f64>,
    /// Provider-reported spend against the budget; may be stale or absent
    #[serde(default)]
    pub budget_spent: Option<f64>,
    #[serde(default)]
    pub budget_remaining: Option<f64>,
    #[serde(default)]
    pub client: Option<ClientRef>,
}

/// A client record as returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
}

/// Month selector for a report, parsed from "YYYY-MM"
///
/// A `ReportMonth` resolves to an inclusive first-day..last-day date range
/// and carries the human-readable label shown on the report. The label is
/// derived from the selected month, never from the wall clock, so historical
/// months render correctly.
///
/// # Examples
/// ```
/// use timetally::types::ReportMonth;
///
/// let month: ReportMonth = "2024-02".parse().unwrap();
/// assert_eq!(month.label(), "February 2024");
/// assert_eq!(month.last_day().to_string(), "2024-02-29");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReportMonth {
    year: i32,
    month: u32,
}

impl ReportMonth {
    /// Create a ReportMonth, validating the month number
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(TallyError::InvalidMonth(format!("{year:04}-{month:02}")));
        }
        // Reject years NaiveDate cannot represent
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| TallyError::InvalidMonth(format!("{year:04}-{month:02}")))?;
        Ok(Self { year, month })
    }

    /// The current calendar month
    pub fn current() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated on construction")
    }

    /// Last day of the month
    pub fn last_day(&self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .expect("validated on construction")
            .pred_opt()
            .expect("first of month always has a predecessor")
    }

    /// Human-readable label, e.g. "January 2024"
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl FromStr for ReportMonth {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TallyError::InvalidMonth(s.to_string());
        let (year_str, month_str) = s.split_once('-').ok_or_else(invalid)?;
        if year_str.len() != 4 || month_str.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year_str.parse().map_err(|_| invalid())?;
        let month: u32 = month_str.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
