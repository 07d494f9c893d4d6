//! timetally - monthly budget reports from Harvest-style time tracking data

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use timetally::{
    cli::{Cli, Command, parse_month},
    config::{Credentials, ReportConfig},
    error::{Result, TallyError},
    filters::EntryFilter,
    harvest::HarvestClient,
    html::{FileSink, render_report},
    output::get_formatter,
    report::ReportAssembler,
    schedule::Scheduler,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_config(cli: &Cli) -> Result<ReportConfig> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => ReportConfig::default_path().ok_or_else(|| {
            TallyError::Config("no config directory available; pass --config".to_string())
        })?,
    };
    ReportConfig::load(path)
}

fn build_client(cli: &Cli) -> Result<HarvestClient> {
    let credentials = Credentials::ensure(cli.account_id.clone(), cli.token.clone())?;
    HarvestClient::new(credentials)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. The --verbose flag should override RUST_LOG.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("timetally=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &cli.command {
        Command::Report { month, user } => {
            // Fail fast on a malformed month before touching the network
            let month = parse_month(month.as_deref())?;
            let filter = user.as_ref().map(|u| EntryFilter::new().with_user(u.as_str()));

            let client = build_client(&cli)?;
            let config = load_config(&cli)?;
            let assembler = ReportAssembler::new(Arc::new(client), config);

            let report = assembler.build_report(month, filter.as_ref()).await?;
            let formatter = get_formatter(cli.json);
            println!("{}", formatter.format_report(&report));
        }

        Command::Html { month, out } => {
            let month = parse_month(month.as_deref())?;

            let client = build_client(&cli)?;
            let config = load_config(&cli)?;
            let assembler = ReportAssembler::new(Arc::new(client), config);

            let report = assembler.build_report(month, None).await?;
            std::fs::write(out, render_report(&report))?;
            info!(path = %out.display(), "report written");
        }

        Command::Schedule {
            every_hours,
            out_dir,
        } => {
            let client = build_client(&cli)?;
            let config = load_config(&cli)?;
            let assembler = Arc::new(ReportAssembler::new(Arc::new(client), config));

            let sink = Box::new(FileSink::new(out_dir.clone()));
            let scheduler = Scheduler::new(
                assembler,
                sink,
                Duration::from_secs(every_hours * 60 * 60),
            );
            scheduler.run().await?;
        }

        Command::Check => {
            let client = build_client(&cli)?;
            if client.test_connection().await? {
                println!("Credentials accepted by the provider.");
            } else {
                return Err(TallyError::Config(
                    "credentials were rejected by the provider".to_string(),
                ));
            }
        }
    }

    Ok(())
}
