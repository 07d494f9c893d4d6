//! HTML rendering for the emailed report
//!
//! Produces a self-contained HTML document (inline styles, no external
//! assets) from a built report. Actual mail transport lives behind the
//! [`ReportSink`] trait; the bundled [`FileSink`] writes the document to a
//! directory, which doubles as the fallback delivery path when no mailer is
//! wired up.

use crate::aggregation::{AggregateRow, Totals};
use crate::error::Result;
use crate::report::Report;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

const STYLE: &str = "font-family: Helvetica, Arial, sans-serif; border-collapse: collapse;";
const CELL: &str = "border: 1px solid #ddd; padding: 6px 10px; text-align: right;";
const NAME_CELL: &str = "border: 1px solid #ddd; padding: 6px 10px; text-align: left;";
const HEAD_CELL: &str = "border: 1px solid #ddd; padding: 6px 10px; background: #f4f4f4;";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn push_table(out: &mut String, title: &str, rows: &[AggregateRow]) {
    let _ = write!(out, "<h2>{}</h2>", escape(title));
    let _ = write!(out, "<table style=\"{STYLE}\"><tr>");
    for heading in [
        "Group",
        "Hours",
        "Billable",
        "Billed",
        "Budget",
        "Spent",
        "Remaining",
        "Used",
        "Complete",
    ] {
        let _ = write!(out, "<th style=\"{HEAD_CELL}\">{heading}</th>");
    }
    let _ = write!(out, "</tr>");

    for row in rows {
        let _ = write!(out, "<tr><td style=\"{NAME_CELL}\">{}</td>", escape(&row.name));
        let _ = write!(out, "<td style=\"{CELL}\">{:.2}</td>", row.total_hours);
        let _ = write!(out, "<td style=\"{CELL}\">{:.2}</td>", row.billable_hours);
        let _ = write!(out, "<td style=\"{CELL}\">${:.2}</td>", row.billed_amount);
        let _ = write!(out, "<td style=\"{CELL}\">${:.2}</td>", row.budget);
        let _ = write!(out, "<td style=\"{CELL}\">${:.2}</td>", row.budget_spent);
        let _ = write!(out, "<td style=\"{CELL}\">${:.2}</td>", row.budget_remaining);
        let _ = write!(out, "<td style=\"{CELL}\">{:.2}%</td>", row.budget_used_pct);
        let _ = write!(
            out,
            "<td style=\"{CELL}\">{:.2}%</td></tr>",
            row.budget_percent_complete
        );
    }

    let totals = Totals::from_rows(rows);
    let _ = write!(
        out,
        "<tr><td style=\"{NAME_CELL}\"><strong>Total</strong></td>\
         <td style=\"{CELL}\"><strong>{:.2}</strong></td>\
         <td style=\"{CELL}\"><strong>{:.2}</strong></td>\
         <td style=\"{CELL}\"><strong>${:.2}</strong></td>\
         <td style=\"{CELL}\" colspan=\"5\"></td></tr>",
        totals.total_hours, totals.billable_hours, totals.billed_amount
    );
    let _ = write!(out, "</table>");
}

/// Render a report as a self-contained HTML document string
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>Budget report {}</title></head><body style=\"{STYLE}\">",
        escape(&report.label)
    );
    let _ = write!(out, "<h1>Budget report for {}</h1>", escape(&report.label));

    push_table(&mut out, "Projects", &report.primary);
    push_table(&mut out, "Hosting &amp; support", &report.hosting_support);

    let _ = write!(
        out,
        "<p><strong>Total hours: {:.2}</strong></p></body></html>",
        report.total_hours
    );
    out
}

/// Destination for a rendered report
///
/// An SMTP transport would implement this; the report engine only needs
/// somewhere to hand the finished document.
pub trait ReportSink {
    fn deliver(&self, report: &Report, html: &str) -> Result<()>;
}

/// Writes rendered reports to a directory, one file per month
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path the report for a given month lands at
    pub fn path_for(&self, report: &Report) -> PathBuf {
        self.dir.join(format!("report-{}.html", report.month))
    }
}

impl ReportSink for FileSink {
    fn deliver(&self, report: &Report, html: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(report);
        std::fs::write(&path, html)?;
        info!(path = %path.display(), "report written");
        Ok(())
    }
}
