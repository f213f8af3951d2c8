//! Network Metrics - daily subgraph/indexer dashboard job
//!
//! Counts subgraphs and unique active indexers per network, snapshots the
//! counts once a day, and renders CSV/JSON/HTML reports with 24h changes.
//!
//! Usage:
//!   cargo run --release --bin network_metrics
//!
//! Schedule it hourly (or at least once inside the snapshot hour); only the
//! run inside `METRIC_SNAPSHOT_HOUR` writes the day's snapshot.
//!
//! Environment variables:
//!   GRAPH_API_KEY - Gateway API key (required)
//!   METRIC_SNAPSHOT_HOUR - UTC hour for the daily snapshot (default: 8)
//!   REPORTS_DIR - Report output directory (default: reports)
//!   METRICS_DIR - Snapshot directory (default: reports/metrics)
//!   LOGS_DIR - Log file directory (default: logs)
//!   DELTA_KEY_SCOPE - today | union (default: today)
//!   RUST_LOG - Logging level (optional, default: info)

use chrono::Utc;
use dotenv::dotenv;
use log::{error, info};
use network_metrics::pipeline::{run_once, FileSnapshotStore, GraphGatewaySource, RunOptions, RunOutcome};
use network_metrics::{logging, MetricsConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let config = MetricsConfig::from_env();

    let logs_dir = config
        .as_ref()
        .map(|c| c.logs_dir.clone())
        .unwrap_or_else(|_| PathBuf::from("logs"));
    logging::init(&logs_dir);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("🚀 Starting network subgraph metrics job");
    info!("   ├─ Endpoint: {}", config.redacted_endpoint());
    info!("   ├─ Page size: {}", config.page_size);
    info!("   ├─ Snapshot hour: {:02}:00 UTC", config.snapshot_hour);
    info!("   ├─ Reports: {}", config.reports_dir.display());
    info!("   └─ Snapshots: {}", config.metrics_dir.display());

    let source = match GraphGatewaySource::from_config(&config) {
        Ok(source) => source,
        Err(e) => {
            error!("❌ Failed to build gateway client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let store = FileSnapshotStore::new(config.metrics_dir.clone());
    let options = RunOptions::from(&config);

    match run_once(&source, &store, &options, Utc::now()).await {
        Ok(RunOutcome::Completed(report)) => {
            info!("✅ Run complete");
            info!("   ├─ Networks: {}", report.networks);
            info!("   ├─ Subgraphs: {}", report.total);
            match report.total_delta {
                Some(delta) => info!("   ├─ Since yesterday: {:+}", delta),
                None => info!("   ├─ Since yesterday: N/A"),
            }
            info!(
                "   └─ Snapshot: {}",
                report
                    .snapshot_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "not written".to_string())
            );
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::NoData) => {
            error!("❌ No data retrieved");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("❌ Run aborted, reports left unchanged: {}", e);
            ExitCode::FAILURE
        }
    }
}
