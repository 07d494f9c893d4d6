//! Report configuration loading from config.toml
//!
//! The target groups a report rolls raw provider records into are operator
//! configuration, not code: an ordered list of keyword-tagged project
//! targets, an ordered list of client targets for the hosting-support table,
//! the keyword set that marks a project as hosting-support work, and the
//! billing-rate policy. Declaration order matters: when a name matches the
//! keywords of more than one target, the first declared target wins.
//!
//! ```toml
//! fallback_rate = 75.0
//! rate_source = "billable-rate"
//! hosting_keywords = ["hosting", "support"]
//! recipients = ["ops@example.com"]
//!
//! [[projects]]
//! name = "Platform Rebuild"
//! keywords = ["platform", "rebuild"]
//! budget_fallback = 20000.0
//!
//! [[clients]]
//! name = "Acme Corp"
//! keywords = ["acme"]
//! support_hours = 8.0
//! rate = 150.0
//! ```

use crate::error::{Result, TallyError};
use crate::types::TimeEntry;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default hourly rate applied when an entry carries no rate of its own
pub const DEFAULT_FALLBACK_RATE: f64 = 75.0;

/// Which entry field the billed amount is computed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateSource {
    /// Prefer the entry's `billable_rate`, then `hourly_rate`
    #[default]
    BillableRate,
    /// Prefer the entry's `hourly_rate`, then `billable_rate`
    HourlyRate,
}

/// Billing-rate policy: preferred rate field plus the fallback constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePolicy {
    pub source: RateSource,
    pub fallback: f64,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            source: RateSource::BillableRate,
            fallback: DEFAULT_FALLBACK_RATE,
        }
    }
}

impl RatePolicy {
    /// Resolve the hourly rate an entry bills at
    pub fn rate_for(&self, entry: &TimeEntry) -> f64 {
        let (preferred, secondary) = match self.source {
            RateSource::BillableRate => (entry.billable_rate, entry.hourly_rate),
            RateSource::HourlyRate => (entry.hourly_rate, entry.billable_rate),
        };
        preferred.or(secondary).unwrap_or(self.fallback)
    }
}

/// A named business category consolidating raw projects
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectTarget {
    /// Display name, unique among targets
    pub name: String,
    /// Lowercase substrings matched against raw project names
    pub keywords: Vec<String>,
    /// Budget substituted when the provider reports 0/absent for a matched project
    #[serde(default)]
    pub budget_fallback: Option<f64>,
}

/// A hosting-support category keyed by client rather than project
#[derive(Debug, Clone, Deserialize)]
pub struct ClientTarget {
    /// Display name, unique among targets
    pub name: String,
    /// Lowercase substrings matched against client names
    pub keywords: Vec<String>,
    /// Fixed support-hour allotment per month
    pub support_hours: f64,
    /// Fixed billing rate per support hour; nominal budget = hours x rate
    pub rate: f64,
}

impl ClientTarget {
    /// Nominal monthly budget for this client
    pub fn nominal_budget(&self) -> f64 {
        self.support_hours * self.rate
    }
}

/// The full report configuration as loaded from config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: f64,
    #[serde(default)]
    pub rate_source: RateSource,
    /// Project-name keywords that mark a record as hosting-support work
    #[serde(default)]
    pub hosting_keywords: Vec<String>,
    /// Addresses the rendered report is intended for; read-only here
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default, rename = "projects")]
    pub project_targets: Vec<ProjectTarget>,
    #[serde(default, rename = "clients")]
    pub client_targets: Vec<ClientTarget>,
}

fn default_fallback_rate() -> f64 {
    DEFAULT_FALLBACK_RATE
}

impl ReportConfig {
    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TallyError::Config(format!("failed to read {}: {e}", path.display()))
        })?;

        let mut config: ReportConfig = toml::from_str(&contents)
            .map_err(|e| TallyError::Config(format!("failed to parse {}: {e}", path.display())))?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Default config location: `<config dir>/timetally/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("timetally").join("config.toml"))
    }

    /// The billing-rate policy configured for this report
    pub fn rate_policy(&self) -> RatePolicy {
        RatePolicy {
            source: self.rate_source,
            fallback: self.fallback_rate,
        }
    }

    /// Lowercase every keyword set; matching is case-insensitive throughout
    fn normalize(&mut self) {
        for keyword in &mut self.hosting_keywords {
            *keyword = keyword.to_lowercase();
        }
        for target in &mut self.project_targets {
            for keyword in &mut target.keywords {
                *keyword = keyword.to_lowercase();
            }
        }
        for target in &mut self.client_targets {
            for keyword in &mut target.keywords {
                *keyword = keyword.to_lowercase();
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.fallback_rate < 0.0 || !self.fallback_rate.is_finite() {
            return Err(TallyError::Config(format!(
                "fallback_rate must be a non-negative number, got {}",
                self.fallback_rate
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for name in self
            .project_targets
            .iter()
            .map(|t| &t.name)
            .chain(self.client_targets.iter().map(|t| &t.name))
        {
            if !seen.insert(name.as_str()) {
                return Err(TallyError::Config(format!("duplicate target name '{name}'")));
            }
        }

        for target in &self.project_targets {
            if target.keywords.iter().any(|k| k.trim().is_empty()) || target.keywords.is_empty() {
                return Err(TallyError::Config(format!(
                    "project target '{}' needs at least one non-empty keyword",
                    target.name
                )));
            }
            if let Some(budget) = target.budget_fallback
                && (budget < 0.0 || !budget.is_finite())
            {
                return Err(TallyError::Config(format!(
                    "project target '{}' has a negative budget_fallback",
                    target.name
                )));
            }
        }

        for target in &self.client_targets {
            if target.keywords.iter().any(|k| k.trim().is_empty()) || target.keywords.is_empty() {
                return Err(TallyError::Config(format!(
                    "client target '{}' needs at least one non-empty keyword",
                    target.name
                )));
            }
            if target.support_hours < 0.0
                || !target.support_hours.is_finite()
                || target.rate < 0.0
                || !target.rate.is_finite()
            {
                return Err(TallyError::Config(format!(
                    "client target '{}' has negative support_hours or rate",
                    target.name
                )));
            }
        }

        Ok(())
    }
}

/// Account credentials for the time tracking provider
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account_id: String,
    pub token: String,
}

impl Credentials {
    /// Build credentials, failing with a clear "not configured" signal when
    /// either half is missing
    pub fn ensure(account_id: Option<String>, token: Option<String>) -> Result<Self> {
        match (account_id, token) {
            (Some(account_id), Some(token)) if !account_id.is_empty() && !token.is_empty() => {
                Ok(Self { account_id, token })
            }
            _ => Err(TallyError::NotConfigured(
                "set HARVEST_ACCOUNT_ID and HARVEST_TOKEN (or pass --account-id/--token)"
                    .to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProjectId, ProjectRef};
    use chrono::NaiveDate;

    const SAMPLE: &str = r#"
        fallback_rate = 80.0
        rate_source = "hourly-rate"
        hosting_keywords = ["Hosting", "support"]
        recipients = ["ops@example.com"]

        [[projects]]
        name = "Platform Rebuild"
        keywords = ["Platform", "rebuild"]
        budget_fallback = 20000.0

        [[projects]]
        name = "Mobile App"
        keywords = ["mobile"]

        [[clients]]
        name = "Acme Corp"
        keywords = ["acme"]
        support_hours = 8.0
        rate = 150.0
    "#;

    fn entry_with_rates(billable_rate: Option<f64>, hourly_rate: Option<f64>) -> TimeEntry {
        TimeEntry {
            id: 1,
            spent_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            hours: 1.0,
            billable: true,
            billable_rate,
            hourly_rate,
            project: ProjectRef {
                id: ProjectId::new(10),
                name: "Platform Rebuild".to_string(),
            },
            client: None,
            user: None,
        }
    }

    #[test]
    fn test_parse_sample_config() {
        let mut config: ReportConfig = toml::from_str(SAMPLE).unwrap();
        config.normalize();
        config.validate().unwrap();

        assert_eq!(config.fallback_rate, 80.0);
        assert_eq!(config.rate_source, RateSource::HourlyRate);
        // Keywords are lowercased on load
        assert_eq!(config.hosting_keywords, vec!["hosting", "support"]);
        assert_eq!(config.project_targets.len(), 2);
        assert_eq!(config.project_targets[0].keywords, vec!["platform", "rebuild"]);
        assert_eq!(config.project_targets[1].budget_fallback, None);
        assert_eq!(config.client_targets[0].nominal_budget(), 1200.0);
    }

    #[test]
    fn test_defaults() {
        let config: ReportConfig = toml::from_str("").unwrap();
        assert_eq!(config.fallback_rate, DEFAULT_FALLBACK_RATE);
        assert_eq!(config.rate_source, RateSource::BillableRate);
        assert!(config.project_targets.is_empty());
        assert!(config.client_targets.is_empty());
    }

    #[test]
    fn test_validation_rejects_duplicate_names() {
        let toml_str = r#"
            [[projects]]
            name = "Acme"
            keywords = ["acme"]

            [[clients]]
            name = "Acme"
            keywords = ["acme"]
            support_hours = 8.0
            rate = 150.0
        "#;
        let mut config: ReportConfig = toml::from_str(toml_str).unwrap();
        config.normalize();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_keywords() {
        let toml_str = r#"
            [[projects]]
            name = "Acme"
            keywords = []
        "#;
        let mut config: ReportConfig = toml::from_str(toml_str).unwrap();
        config.normalize();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rate_policy_prefers_configured_source() {
        let billable_first = RatePolicy::default();
        assert_eq!(billable_first.rate_for(&entry_with_rates(Some(100.0), Some(90.0))), 100.0);
        assert_eq!(billable_first.rate_for(&entry_with_rates(None, Some(90.0))), 90.0);
        assert_eq!(billable_first.rate_for(&entry_with_rates(None, None)), 75.0);

        let hourly_first = RatePolicy {
            source: RateSource::HourlyRate,
            fallback: 50.0,
        };
        assert_eq!(hourly_first.rate_for(&entry_with_rates(Some(100.0), Some(90.0))), 90.0);
        assert_eq!(hourly_first.rate_for(&entry_with_rates(Some(100.0), None)), 100.0);
        assert_eq!(hourly_first.rate_for(&entry_with_rates(None, None)), 50.0);
    }

    #[test]
    fn test_credentials_ensure() {
        assert!(Credentials::ensure(Some("12345".into()), Some("token".into())).is_ok());

        let err = Credentials::ensure(None, Some("token".into())).unwrap_err();
        assert!(matches!(err, TallyError::NotConfigured(_)));
        assert!(Credentials::ensure(Some(String::new()), Some("token".into())).is_err());
    }
}
