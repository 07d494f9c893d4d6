//! Finalization of accumulated group sums into report rows
//!
//! Accumulation happens in full precision; rounding is applied exactly once
//! here, on output, so rounding error never compounds across entries. The
//! derived percentage fields follow two hard rules: a group with no budget
//! (`budget <= 0`) reports both percentages as 0 regardless of activity, and
//! remaining budget never goes negative even when spend exceeds budget.

use crate::categorize::PartialRow;
use crate::error::{Result, TallyError};
use serde::Serialize;
use std::cmp::Ordering;

/// A finalized report row for one target group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub name: String,
    pub total_hours: f64,
    pub billable_hours: f64,
    pub billed_amount: f64,
    pub budget: f64,
    pub budget_spent: f64,
    pub budget_remaining: f64,
    /// budget_spent / budget x 100, 0 when no budget is set
    pub budget_used_pct: f64,
    /// billed_amount / budget x 100, the primary health metric
    pub budget_percent_complete: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn check(name: &str, field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(TallyError::Validation(format!(
            "group '{name}': {field} is not a finite number"
        )));
    }
    if value < 0.0 {
        return Err(TallyError::Validation(format!(
            "group '{name}': negative {field} ({value})"
        )));
    }
    Ok(value)
}

/// Compute the derived fields for one accumulated row
///
/// Negative or non-finite sums indicate a provider data defect and are
/// rejected rather than coerced to zero.
pub fn finalize(partial: PartialRow) -> Result<AggregateRow> {
    let name = partial.name;
    let total_hours = check(&name, "hours", partial.total_hours)?;
    let billable_hours = check(&name, "billable hours", partial.billable_hours)?;
    let billed_amount = check(&name, "billed amount", partial.billed_amount)?;
    let budget = check(&name, "budget", partial.budget)?;
    let budget_spent = check(&name, "budget spent", partial.budget_spent)?;

    let budget_remaining = (budget - budget_spent).max(0.0);
    let (budget_used_pct, budget_percent_complete) = if budget <= 0.0 {
        (0.0, 0.0)
    } else {
        (
            budget_spent / budget * 100.0,
            billed_amount / budget * 100.0,
        )
    };

    Ok(AggregateRow {
        name,
        total_hours: round2(total_hours),
        billable_hours: round2(billable_hours),
        billed_amount: round2(billed_amount),
        budget: round2(budget),
        budget_spent: round2(budget_spent),
        budget_remaining: round2(budget_remaining),
        budget_used_pct: round2(budget_used_pct),
        budget_percent_complete: round2(budget_percent_complete),
    })
}

/// Finalize a whole pass, preserving declaration order
pub fn finalize_rows(rows: Vec<PartialRow>) -> Result<Vec<AggregateRow>> {
    rows.into_iter().map(finalize).collect()
}

/// Sort rows by hours, most active first
///
/// The sort is stable: ties keep the order rows were declared in.
pub fn sort_by_hours_desc(rows: &mut [AggregateRow]) {
    rows.sort_by(|a, b| {
        b.total_hours
            .partial_cmp(&a.total_hours)
            .unwrap_or(Ordering::Equal)
    });
}

/// Grand totals across row sets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub total_hours: f64,
    pub billable_hours: f64,
    pub billed_amount: f64,
}

impl Totals {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a AggregateRow>) -> Self {
        let mut totals = Self::default();
        for row in rows {
            totals.total_hours += row.total_hours;
            totals.billable_hours += row.billable_hours;
            totals.billed_amount += row.billed_amount;
        }
        totals.total_hours = round2(totals.total_hours);
        totals.billable_hours = round2(totals.billable_hours);
        totals.billed_amount = round2(totals.billed_amount);
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(name: &str) -> PartialRow {
        PartialRow {
            name: name.to_string(),
            ..PartialRow::default()
        }
    }

    #[test]
    fn test_zero_budget_yields_zero_percentages() {
        let mut row = partial("No Budget");
        row.total_hours = 40.0;
        row.billable_hours = 40.0;
        row.billed_amount = 4000.0;
        row.budget = 0.0;
        row.budget_spent = 0.0;

        let agg = finalize(row).unwrap();
        assert_eq!(agg.budget_used_pct, 0.0);
        assert_eq!(agg.budget_percent_complete, 0.0);
        assert_eq!(agg.billed_amount, 4000.0);
    }

    #[test]
    fn test_remaining_budget_never_negative() {
        let mut row = partial("Overspent");
        row.budget = 1000.0;
        row.budget_spent = 1500.0;

        let agg = finalize(row).unwrap();
        assert_eq!(agg.budget_remaining, 0.0);
        assert_eq!(agg.budget_used_pct, 150.0);
    }

    #[test]
    fn test_percentages_computed_against_budget() {
        let mut row = partial("Healthy");
        row.total_hours = 10.0;
        row.billable_hours = 8.0;
        row.billed_amount = 800.0;
        row.budget = 3200.0;
        row.budget_spent = 1600.0;

        let agg = finalize(row).unwrap();
        assert_eq!(agg.budget_used_pct, 50.0);
        assert_eq!(agg.budget_percent_complete, 25.0);
        assert_eq!(agg.budget_remaining, 1600.0);
    }

    #[test]
    fn test_rounding_happens_once_on_output() {
        // 0.1 hours x 3 accumulates to 0.30000000000000004
        let mut row = partial("Tiny");
        row.total_hours = 0.1 + 0.1 + 0.1;
        row.billed_amount = (0.1 + 0.1 + 0.1) * 33.33;

        let agg = finalize(row).unwrap();
        assert_eq!(agg.total_hours, 0.3);
        assert_eq!(agg.billed_amount, 10.0);
    }

    #[test]
    fn test_negative_hours_rejected() {
        let mut row = partial("Broken");
        row.total_hours = -1.0;
        let err = finalize(row).unwrap_err();
        assert!(matches!(err, TallyError::Validation(_)));
    }

    #[test]
    fn test_nan_rejected() {
        let mut row = partial("Broken");
        row.billed_amount = f64::NAN;
        assert!(finalize(row).is_err());

        let mut row = partial("Broken");
        row.budget = f64::INFINITY;
        assert!(finalize(row).is_err());
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let make = |name: &str, hours: f64| AggregateRow {
            name: name.to_string(),
            total_hours: hours,
            billable_hours: 0.0,
            billed_amount: 0.0,
            budget: 0.0,
            budget_spent: 0.0,
            budget_remaining: 0.0,
            budget_used_pct: 0.0,
            budget_percent_complete: 0.0,
        };

        let mut rows = vec![make("a", 5.0), make("b", 10.0), make("c", 5.0), make("d", 0.0)];
        sort_by_hours_desc(&mut rows);

        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        // "a" and "c" tie at 5.0 and keep declaration order
        assert_eq!(names, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_totals_from_rows() {
        let make = |hours: f64, billed: f64| AggregateRow {
            name: "x".to_string(),
            total_hours: hours,
            billable_hours: hours,
            billed_amount: billed,
            budget: 0.0,
            budget_spent: 0.0,
            budget_remaining: 0.0,
            budget_used_pct: 0.0,
            budget_percent_complete: 0.0,
        };

        let rows = vec![make(1.25, 100.0), make(2.5, 250.5)];
        let totals = Totals::from_rows(&rows);
        assert_eq!(totals.total_hours, 3.75);
        assert_eq!(totals.billed_amount, 350.5);
    }
}
