//! Periodic report delivery loop
//!
//! Runs the same build path as the interactive command on a fixed interval
//! (weekly by default), renders the current month's report to HTML, and
//! hands it to the configured sink. A failed build or delivery is logged and
//! the loop keeps ticking; the report engine itself never retries an
//! upstream call.

use crate::error::Result;
use crate::html::{ReportSink, render_report};
use crate::report::ReportAssembler;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

/// Periodic driver around [`ReportAssembler::build_report`]
pub struct Scheduler {
    assembler: Arc<ReportAssembler>,
    sink: Box<dyn ReportSink + Send + Sync>,
    every: Duration,
}

impl Scheduler {
    pub fn new(
        assembler: Arc<ReportAssembler>,
        sink: Box<dyn ReportSink + Send + Sync>,
        every: Duration,
    ) -> Self {
        Self {
            assembler,
            sink,
            every,
        }
    }

    /// Build and deliver the current month's report once
    pub async fn tick(&self) -> Result<()> {
        let report = self.assembler.build_report(None, None).await?;
        let html = render_report(&report);
        self.sink.deliver(&report, &html)?;
        info!(month = %report.month, total_hours = report.total_hours, "report delivered");
        Ok(())
    }

    /// Run the loop forever; the first report is produced immediately
    pub async fn run(self) -> Result<()> {
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(every_secs = self.every.as_secs(), "schedule loop started");

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                error!("scheduled report failed: {e}");
            }
        }
    }
}
