//! Filtering module for time entries
//!
//! This module provides the inclusive date range a report is bounded by and
//! the optional client-side entry filter applied after fetching.
//!
//! # Examples
//!
//! ```
//! use timetally::filters::{DateRange, EntryFilter};
//! use chrono::NaiveDate;
//!
//! let range = DateRange::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//! ).unwrap();
//! assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
//!
//! let filter = EntryFilter::new().with_user("kim");
//! ```

use crate::error::{Result, TallyError};
use crate::types::TimeEntry;
use chrono::NaiveDate;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day of the range (inclusive)
    pub from: NaiveDate,
    /// Last day of the range (inclusive)
    pub to: NaiveDate,
}

impl DateRange {
    /// Create a new range, rejecting an inverted pair
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(TallyError::Validation(format!(
                "date range start {from} is after end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// Check whether a date falls within the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// Filter configuration for fetched time entries
///
/// The provider query is bounded by date server-side; the user filter is a
/// free-text substring applied client-side after the network call.
#[derive(Debug, Default, Clone)]
pub struct EntryFilter {
    /// Case-insensitive substring matched against the entry's user name
    pub user: Option<String>,
}

impl EntryFilter {
    /// Create a new filter with no restrictions
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user-name substring filter
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Check if an entry passes the filter
    pub fn matches(&self, entry: &TimeEntry) -> bool {
        if let Some(wanted) = &self.user {
            let wanted = wanted.to_lowercase();
            match &entry.user {
                Some(user) => {
                    if !user.name.to_lowercase().contains(&wanted) {
                        return false;
                    }
                }
                // Filter names a user but the entry carries none
                None => return false,
            }
        }

        true
    }

    /// Apply the filter to a fetched batch, keeping matching entries
    pub fn apply(&self, entries: Vec<TimeEntry>) -> Vec<TimeEntry> {
        if self.user.is_none() {
            return entries;
        }
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProjectId, ProjectRef, UserRef};

    fn entry_for_user(user: Option<&str>) -> TimeEntry {
        TimeEntry {
            id: 1,
            spent_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            hours: 1.0,
            billable: true,
            billable_rate: None,
            hourly_rate: None,
            project: ProjectRef {
                id: ProjectId::new(10),
                name: "Platform Rebuild".to_string(),
            },
            client: None,
            user: user.map(|name| UserRef {
                id: 7,
                name: name.to_string(),
            }),
        }
    }

    #[test]
    fn test_date_range_rejects_inverted_pair() {
        let from = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(DateRange::new(from, to).is_err());
        assert!(DateRange::new(to, from).is_ok());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap();

        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
    }

    #[test]
    fn test_user_filter_is_case_insensitive_substring() {
        let filter = EntryFilter::new().with_user("allen");

        assert!(filter.matches(&entry_for_user(Some("Kim Allen"))));
        assert!(!filter.matches(&entry_for_user(Some("Pat Moore"))));
        assert!(!filter.matches(&entry_for_user(None)));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = EntryFilter::new();
        assert!(filter.matches(&entry_for_user(None)));

        let entries = vec![entry_for_user(Some("Kim Allen")), entry_for_user(None)];
        assert_eq!(filter.apply(entries).len(), 2);
    }

    #[test]
    fn test_apply_drops_non_matching_entries() {
        let filter = EntryFilter::new().with_user("kim");
        let entries = vec![
            entry_for_user(Some("Kim Allen")),
            entry_for_user(Some("Pat Moore")),
        ];

        let kept = filter.apply(entries);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].user.as_ref().unwrap().name, "Kim Allen");
    }
}
