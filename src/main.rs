use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use erp_usage_intelligence::models::OVERALL_SCORE_FIELD;
use erp_usage_intelligence::ranking::top_n;
use erp_usage_intelligence::report::build_report;
use erp_usage_intelligence::source::{
    poll, DataSource, FileSource, SnapshotStore, DEFAULT_REFRESH_INTERVAL,
};
use erp_usage_intelligence::{classify_tier, DashboardSummary, Snapshot};

#[derive(Parser)]
#[command(name = "erp-usage")]
#[command(about = "Rankings and RM performance from ERP usage score sheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Rows file: JSON (`{"rows": [...]}` or an array) or CSV
    #[arg(long, env = "ERP_USAGE_ROWS")]
    rows: PathBuf,
    /// Stats file with `average_overall_score`
    #[arg(long, env = "ERP_USAGE_STATS")]
    stats: Option<PathBuf>,
}

impl SourceArgs {
    fn source(&self) -> FileSource {
        FileSource::new(&self.rows, self.stats.clone())
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard summary
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// List the best clients by overall score
    Top {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Re-read the source on an interval and print a summary per refresh
    Watch {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL.as_secs())]
        interval_secs: u64,
        #[arg(long)]
        max_refreshes: Option<usize>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(source: &SourceArgs) -> anyhow::Result<Snapshot> {
    source
        .source()
        .fetch()
        .with_context(|| format!("failed to load rows from {}", source.rows.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { source, format } => {
            let snapshot = load(&source)?;
            let summary = DashboardSummary::from_snapshot(&snapshot);
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                Format::Markdown => print!("{}", build_report(&summary, &snapshot.rows)),
            }
        }
        Commands::Top { source, limit } => {
            let snapshot = load(&source)?;
            let top = top_n(&snapshot.rows, OVERALL_SCORE_FIELD, limit);

            if top.is_empty() {
                println!("No clients found in this snapshot.");
                return Ok(());
            }

            println!("Top clients by overall score:");
            for (position, client) in top.iter().enumerate() {
                println!(
                    "{}. {} score {:.2} ({})",
                    position + 1,
                    client.name,
                    client.score,
                    classify_tier(client.score).label()
                );
            }
        }
        Commands::Report { source, out } => {
            let snapshot = load(&source)?;
            let summary = DashboardSummary::from_snapshot(&snapshot);
            let report = build_report(&summary, &snapshot.rows);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Watch {
            source,
            interval_secs,
            max_refreshes,
        } => {
            let store = SnapshotStore::default();
            let _subscription = store.subscribe(|snapshot: &Arc<Snapshot>| {
                let summary = DashboardSummary::from_snapshot(snapshot);
                match serde_json::to_string(&summary) {
                    Ok(line) => println!("{line}"),
                    Err(err) => tracing::error!(error = %err, "failed to serialize summary"),
                }
            });

            let file_source = source.source();
            let interval = Duration::from_secs(interval_secs.max(1));
            info!(rows = %source.rows.display(), ?interval, "watching");

            tokio::select! {
                _ = poll(&store, &file_source, interval, max_refreshes) => {}
                result = tokio::signal::ctrl_c() => {
                    result.context("failed to listen for ctrl-c")?;
                    info!("interrupted");
                }
            }
        }
    }

    Ok(())
}
