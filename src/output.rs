//! Output formatting module for timetally
//!
//! This module provides formatters for displaying a built report in
//! different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools

use crate::aggregation::{AggregateRow, Totals};
use crate::report::Report;
use colored::Colorize;
use prettytable::{Table, format, row};

/// Trait for report output formatters
pub trait OutputFormatter {
    /// Format a complete monthly report
    fn format_report(&self, report: &Report) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl TableFormatter {
    fn format_currency(amount: f64) -> String {
        format!("${amount:.2}")
    }

    fn format_hours(hours: f64) -> String {
        format!("{hours:.2}")
    }

    fn format_pct(pct: f64) -> String {
        let s = format!("{pct:.2}%");
        if pct > 100.0 {
            s.red().to_string()
        } else if pct > 80.0 {
            s.yellow().to_string()
        } else {
            s
        }
    }

    fn rows_table(rows: &[AggregateRow]) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Group",
            b -> "Hours",
            b -> "Billable",
            b -> "Billed",
            b -> "Budget",
            b -> "Spent",
            b -> "Remaining",
            b -> "Used",
            b -> "Complete"
        ]);

        for agg in rows {
            table.add_row(row![
                agg.name,
                r -> Self::format_hours(agg.total_hours),
                r -> Self::format_hours(agg.billable_hours),
                r -> Self::format_currency(agg.billed_amount),
                r -> Self::format_currency(agg.budget),
                r -> Self::format_currency(agg.budget_spent),
                r -> Self::format_currency(agg.budget_remaining),
                r -> Self::format_pct(agg.budget_used_pct),
                r -> Self::format_pct(agg.budget_percent_complete)
            ]);
        }

        let totals = Totals::from_rows(rows);
        table.add_row(row![
            b -> "TOTAL",
            br -> Self::format_hours(totals.total_hours),
            br -> Self::format_hours(totals.billable_hours),
            br -> Self::format_currency(totals.billed_amount),
            "",
            "",
            "",
            "",
            ""
        ]);

        table
    }
}

impl OutputFormatter for TableFormatter {
    fn format_report(&self, report: &Report) -> String {
        let mut output = String::new();

        output.push_str(&format!("Budget report for {}\n\n", report.label));
        output.push_str("Projects\n");
        output.push_str(&Self::rows_table(&report.primary).to_string());
        output.push_str("\nHosting & support\n");
        output.push_str(&Self::rows_table(&report.hosting_support).to_string());
        output.push_str(&format!(
            "\nTotal hours: {}\n",
            Self::format_hours(report.total_hours)
        ));

        output
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Get the appropriate formatter based on output format preference
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        Report {
            month: "2024-01".to_string(),
            label: "January 2024".to_string(),
            primary: vec![AggregateRow {
                name: "Platform Rebuild".to_string(),
                total_hours: 42.5,
                billable_hours: 40.0,
                billed_amount: 4000.0,
                budget: 20000.0,
                budget_spent: 5000.0,
                budget_remaining: 15000.0,
                budget_used_pct: 25.0,
                budget_percent_complete: 20.0,
            }],
            hosting_support: vec![AggregateRow {
                name: "Acme Corp".to_string(),
                total_hours: 8.0,
                billable_hours: 8.0,
                billed_amount: 800.0,
                budget: 1200.0,
                budget_spent: 0.0,
                budget_remaining: 1200.0,
                budget_used_pct: 0.0,
                budget_percent_complete: 66.67,
            }],
            total_hours: 50.5,
        }
    }

    #[test]
    fn test_table_format_contains_groups_and_totals() {
        let output = TableFormatter.format_report(&sample_report());
        assert!(output.contains("January 2024"));
        assert!(output.contains("Platform Rebuild"));
        assert!(output.contains("Acme Corp"));
        assert!(output.contains("$4000.00"));
        assert!(output.contains("TOTAL"));
        assert!(output.contains("Total hours: 50.50"));
    }

    #[test]
    fn test_json_format_round_trips() {
        let output = JsonFormatter.format_report(&sample_report());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["month"], "2024-01");
        assert_eq!(parsed["primary"][0]["name"], "Platform Rebuild");
        assert_eq!(parsed["total_hours"], 50.5);
        assert_eq!(parsed["hosting_support"][0]["budget"], 1200.0);
    }
}
