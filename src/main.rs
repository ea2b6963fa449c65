//! tokstat - Token usage statistics across AI command-line tool logs

use chrono::Utc;
use clap::Parser;
use tokstat::{
    CancellationFlag, Result, aggregate, aggregate_by_day,
    cli::{Cli, Command, parse_since},
    collect_scans,
    output::get_formatter,
    with_providers,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --verbose overrides RUST_LOG
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("tokstat=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let since = cli
        .since
        .as_deref()
        .map(|value| parse_since(value, Utc::now()))
        .transpose()?;

    let cancel = CancellationFlag::new();
    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping scans");
            signal_flag.cancel();
        }
    });

    let orchestrator = with_providers(&cli.log_dirs());
    info!("Registered providers: {}", orchestrator.providers().join(", "));

    let scans = collect_scans(&orchestrator, cli.provider.as_deref(), &cancel, since).await?;
    let formatter = get_formatter(cli.json);

    let output = match cli.command.unwrap_or(Command::Summary) {
        Command::Summary => {
            info!("Running usage summary");
            let usage = aggregate(scans.values().flat_map(|scan| scan.result().entries.iter()));
            formatter.format_summary(&usage)?
        }
        Command::Daily => {
            info!("Running daily usage report");
            let records: Vec<_> = scans
                .values()
                .flat_map(|scan| scan.result().entries.iter())
                .collect();
            let daily = aggregate_by_day(records.iter().copied());
            let totals = aggregate(records.iter().copied().filter(|r| r.timestamp.is_some()));
            formatter.format_daily(&daily, &totals)?
        }
        Command::Providers => formatter.format_providers(&scans)?,
    };

    println!("{output}");
    Ok(())
}
