//! Report assembly: the single entry point every caller funnels into
//!
//! Interactive requests and the scheduled loop both build reports here, so
//! there is exactly one version of the categorization + aggregation
//! pipeline. A build fetches projects, clients, and time entries
//! concurrently, runs the project-keyed pass over the non-hosting subset and
//! the client-keyed pass over the hosting subset, finalizes both row sets,
//! and computes the grand total across the two. Any upstream failure aborts
//! the whole build; a partial primary-vs-hosting split would be misleading
//! for budget decisions.

use crate::aggregation::{AggregateRow, Totals, finalize_rows, sort_by_hours_desc};
use crate::categorize::{categorize_by_client, categorize_projects, is_hosting_support, route_entries};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::filters::{DateRange, EntryFilter};
use crate::harvest::TimeSource;
use crate::types::ReportMonth;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// A fully built monthly report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Selected month in YYYY-MM form
    pub month: String,
    /// Human-readable label derived from the selected month
    pub label: String,
    pub primary: Vec<AggregateRow>,
    pub hosting_support: Vec<AggregateRow>,
    /// Hours across both tables
    pub total_hours: f64,
}

/// Builds monthly reports from a time tracking source and a configuration
pub struct ReportAssembler {
    source: Arc<dyn TimeSource>,
    config: ReportConfig,
}

impl ReportAssembler {
    pub fn new(source: Arc<dyn TimeSource>, config: ReportConfig) -> Self {
        Self { source, config }
    }

    /// Build the report for a month, defaulting to the current one
    pub async fn build_report(
        &self,
        month: Option<ReportMonth>,
        filter: Option<&EntryFilter>,
    ) -> Result<Report> {
        let month = month.unwrap_or_else(ReportMonth::current);
        let range = DateRange::new(month.first_day(), month.last_day())?;
        info!(%month, "building report");

        let (projects, clients, entries) = tokio::try_join!(
            self.source.projects(),
            self.source.clients(),
            self.source.time_entries(range, filter),
        )?;
        info!(
            projects = projects.len(),
            clients = clients.len(),
            entries = entries.len(),
            "fetched provider data"
        );

        let rates = self.config.rate_policy();
        let hosting_keywords = &self.config.hosting_keywords;

        // Partition once so an hour is only ever counted in one table
        let (hosting_entries, primary_entries): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|e| is_hosting_support(&e.project.name, hosting_keywords));
        let primary_projects: Vec<_> = projects
            .iter()
            .filter(|p| !is_hosting_support(&p.name, hosting_keywords))
            .cloned()
            .collect();

        let catalog = categorize_projects(&primary_projects, &self.config.project_targets);
        let mut primary = finalize_rows(route_entries(catalog, &primary_entries, &rates))?;

        let mut hosting_support = finalize_rows(categorize_by_client(
            &projects,
            &clients,
            &hosting_entries,
            hosting_keywords,
            &self.config.client_targets,
            &rates,
        ))?;

        sort_by_hours_desc(&mut primary);
        sort_by_hours_desc(&mut hosting_support);

        let totals = Totals::from_rows(primary.iter().chain(hosting_support.iter()));

        Ok(Report {
            month: month.to_string(),
            label: month.label(),
            primary,
            hosting_support,
            total_hours: totals.total_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectTarget;
    use crate::error::TallyError;
    use crate::types::{Client, Project, TimeEntry};
    use async_trait::async_trait;

    struct FailingSource;

    #[async_trait]
    impl TimeSource for FailingSource {
        async fn time_entries(
            &self,
            _range: DateRange,
            _filter: Option<&EntryFilter>,
        ) -> Result<Vec<TimeEntry>> {
            Err(TallyError::Upstream {
                status: 503,
                message: "maintenance".to_string(),
            })
        }

        async fn projects(&self) -> Result<Vec<Project>> {
            Ok(Vec::new())
        }

        async fn clients(&self) -> Result<Vec<Client>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_aborts_whole_report() {
        let config = ReportConfig {
            fallback_rate: 75.0,
            rate_source: Default::default(),
            hosting_keywords: Vec::new(),
            recipients: Vec::new(),
            project_targets: vec![ProjectTarget {
                name: "Acme".to_string(),
                keywords: vec!["acme".to_string()],
                budget_fallback: None,
            }],
            client_targets: Vec::new(),
        };

        let assembler = ReportAssembler::new(Arc::new(FailingSource), config);
        let month: ReportMonth = "2024-01".parse().unwrap();
        let err = assembler.build_report(Some(month), None).await.unwrap_err();
        assert!(matches!(err, TallyError::Upstream { status: 503, .. }));
    }
}
