//! Keyword categorization of raw provider records into target groups
//!
//! Raw projects and time entries arrive with whatever names the provider
//! account accumulated over the years; reports want them consolidated into
//! the configured target groups. Matching is case-insensitive substring
//! containment against each target's keyword list, scanned in declaration
//! order. The first target that matches wins, so a name containing two
//! targets' keywords is only ever counted once.
//!
//! Two passes exist because one raw record can be relevant to two rollups:
//! the project-keyed pass builds the primary table, and a client-keyed pass
//! over the hosting-support subset builds one row per client rather than one
//! row per raw project.
//!
//! Every pass is a fold producing fresh rows; nothing here mutates shared
//! state between passes.

use crate::config::{ClientTarget, ProjectTarget, RatePolicy};
use crate::types::{Client, ClientId, Project, ProjectId, TimeEntry};
use std::collections::HashMap;
use tracing::debug;

/// Accumulated raw sums for one target group, before finalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRow {
    pub name: String,
    pub total_hours: f64,
    pub billable_hours: f64,
    pub billed_amount: f64,
    pub budget: f64,
    pub budget_spent: f64,
}

impl PartialRow {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn add_entry(&mut self, entry: &TimeEntry, rates: &RatePolicy) {
        self.total_hours += entry.hours;
        if entry.billable {
            self.billable_hours += entry.hours;
            self.billed_amount += entry.hours * rates.rate_for(entry);
        }
    }
}

/// First match wins; targets are scanned in declaration order
fn match_keywords<'a, I>(name: &str, keyword_sets: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a Vec<String>>,
{
    let name = name.to_lowercase();
    keyword_sets
        .into_iter()
        .position(|keywords| keywords.iter().any(|k| name.contains(k.as_str())))
}

/// Whether a project name falls in the hosting-support subset
pub fn is_hosting_support(project_name: &str, hosting_keywords: &[String]) -> bool {
    let name = project_name.to_lowercase();
    hosting_keywords.iter().any(|k| name.contains(k.as_str()))
}

/// Result of the project-keyed categorization pass
///
/// Holds one row per declared target (declaration order preserved, zero
/// rows included) plus the id routing map entries are counted through.
/// Entries whose project id never made it into the map still route by a
/// direct name match, so hours logged against a project missing from the
/// project listing are not lost.
#[derive(Debug)]
pub struct ProjectCatalog {
    rows: Vec<PartialRow>,
    keywords: Vec<Vec<String>>,
    by_project: HashMap<ProjectId, usize>,
}

impl ProjectCatalog {
    /// Group index a specific project id was accepted into
    pub fn group_of(&self, id: ProjectId) -> Option<usize> {
        self.by_project.get(&id).copied()
    }

    /// Rows in declaration order
    pub fn rows(&self) -> &[PartialRow] {
        &self.rows
    }
}

/// Project-keyed pass: match raw projects against the declared targets
///
/// Unmatched projects are dropped. A group backed by several raw projects
/// takes the maximum budget seen rather than the sum, so provider-side
/// duplicates of the same engagement do not inflate the budget; when a
/// matched project reports no budget, the target's configured fallback is
/// substituted before the maximum is taken. Budget spend follows whichever
/// project supplied the winning budget.
pub fn categorize_projects(projects: &[Project], targets: &[ProjectTarget]) -> ProjectCatalog {
    let mut rows: Vec<PartialRow> = targets.iter().map(|t| PartialRow::named(&t.name)).collect();
    let mut by_project = HashMap::new();

    for project in projects {
        let Some(idx) = match_keywords(&project.name, targets.iter().map(|t| &t.keywords)) else {
            continue;
        };
        by_project.insert(project.id, idx);

        let reported = project.budget.unwrap_or(0.0);
        let candidate = if reported > 0.0 {
            reported
        } else {
            targets[idx].budget_fallback.unwrap_or(0.0)
        };

        let row = &mut rows[idx];
        if candidate > row.budget {
            row.budget = candidate;
            row.budget_spent = project.budget_spent.unwrap_or(0.0);
        }
    }

    ProjectCatalog {
        rows,
        keywords: targets.iter().map(|t| t.keywords.clone()).collect(),
        by_project,
    }
}

/// Route time entries into the catalogued groups, consuming the catalog
///
/// Each entry routes by its project id when that id was accepted during
/// [`categorize_projects`]; otherwise its project name is matched against
/// the keyword sets directly. Entries matching nothing are excluded.
pub fn route_entries(
    catalog: ProjectCatalog,
    entries: &[TimeEntry],
    rates: &RatePolicy,
) -> Vec<PartialRow> {
    let ProjectCatalog {
        mut rows,
        keywords,
        by_project,
    } = catalog;

    for entry in entries {
        let idx = match by_project.get(&entry.project.id) {
            Some(idx) => Some(*idx),
            None => {
                let fallback = match_keywords(&entry.project.name, keywords.iter());
                if fallback.is_some() {
                    debug!(
                        project = %entry.project.name,
                        "entry routed by name; project id absent from listing"
                    );
                }
                fallback
            }
        };

        if let Some(idx) = idx {
            rows[idx].add_entry(entry, rates);
        }
    }

    rows
}

/// Client-keyed pass over the hosting-support subset
///
/// Only records whose project name matches the hosting keyword set take
/// part. Each matching entry resolves its owning client (the entry's own
/// client reference first, then the project listing's) and the client name
/// is matched against the declared client targets. Every declared client
/// target appears in the output, pre-seeded with its nominal support budget,
/// even with zero matched hours.
pub fn categorize_by_client(
    projects: &[Project],
    clients: &[Client],
    entries: &[TimeEntry],
    hosting_keywords: &[String],
    targets: &[ClientTarget],
    rates: &RatePolicy,
) -> Vec<PartialRow> {
    let mut rows: Vec<PartialRow> = targets
        .iter()
        .map(|t| {
            let mut row = PartialRow::named(&t.name);
            row.budget = t.nominal_budget();
            row
        })
        .collect();

    // Canonical client names from the listing win over stale embedded refs
    let canonical: HashMap<ClientId, &str> =
        clients.iter().map(|c| (c.id, c.name.as_str())).collect();

    let client_of_project: HashMap<ProjectId, &crate::types::ClientRef> = projects
        .iter()
        .filter(|p| is_hosting_support(&p.name, hosting_keywords))
        .filter_map(|p| p.client.as_ref().map(|c| (p.id, c)))
        .collect();

    for entry in entries {
        if !is_hosting_support(&entry.project.name, hosting_keywords) {
            continue;
        }

        let client_ref = entry
            .client
            .as_ref()
            .or_else(|| client_of_project.get(&entry.project.id).copied());
        let Some(client_ref) = client_ref else {
            debug!(
                project = %entry.project.name,
                "hosting-support entry has no resolvable client"
            );
            continue;
        };

        let client_name = canonical
            .get(&client_ref.id)
            .copied()
            .unwrap_or(client_ref.name.as_str());

        if let Some(idx) = match_keywords(client_name, targets.iter().map(|t| &t.keywords)) {
            rows[idx].add_entry(entry, rates);
        }
    }

    rows
}
