//! One run of the daily job: aggregate, snapshot, diff, report
//!
//! Failure domains:
//! - fetch failure aborts before anything is written (stale report remains)
//! - unreadable baseline → reported as "no prior data"
//! - snapshot write failure → logged, reports still rendered

use super::aggregator::aggregate;
use super::diff::{diff, KeyScope};
use super::schedule::{baseline_date, should_persist_snapshot, snapshot_date};
use super::snapshot::{Snapshot, SnapshotStore};
use super::source::PagedSource;
use crate::config::MetricsConfig;
use crate::error::PipelineResult;
use crate::report::{self, ReportInput};
use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;

/// Knobs for `run_once`
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub page_size: usize,
    pub snapshot_hour: u32,
    pub key_scope: KeyScope,
    pub reports_dir: PathBuf,
}

impl From<&MetricsConfig> for RunOptions {
    fn from(config: &MetricsConfig) -> Self {
        Self {
            page_size: config.page_size,
            snapshot_hour: config.snapshot_hour,
            key_scope: config.key_scope,
            reports_dir: config.reports_dir.clone(),
        }
    }
}

/// What a completed run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub networks: usize,
    pub total: u64,
    pub total_delta: Option<i64>,
    /// Set when today's snapshot was written by this run
    pub snapshot_path: Option<PathBuf>,
    pub baseline_found: bool,
    pub report_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunReport),
    /// The source returned no usable records; nothing was written
    NoData,
}

/// Yesterday's snapshot, or `None` if missing or unreadable
pub fn load_baseline(store: &dyn SnapshotStore, date: NaiveDate) -> Option<Snapshot> {
    match store.read(date) {
        Ok(Some(snapshot)) => {
            log::info!(
                "✅ Loaded baseline for {}: {} subgraphs",
                date,
                snapshot.total_count
            );
            Some(snapshot)
        }
        Ok(None) => {
            log::info!("📭 No metric file found for {}", date);
            None
        }
        Err(e) => {
            log::warn!("⚠️  Failed to load baseline snapshot: {}", e);
            None
        }
    }
}

pub async fn run_once<S>(
    source: &S,
    store: &dyn SnapshotStore,
    options: &RunOptions,
    now: DateTime<Utc>,
) -> PipelineResult<RunOutcome>
where
    S: PagedSource + ?Sized,
{
    let summary = aggregate(source, options.page_size).await?;

    if summary.is_empty() {
        log::warn!("⚠️  No data retrieved, keeping previous reports");
        return Ok(RunOutcome::NoData);
    }

    let baseline = load_baseline(store, baseline_date(now));

    let mut snapshot_path = None;
    if should_persist_snapshot(now, options.snapshot_hour) {
        log::info!("📅 Total subgraphs today: {}", summary.total);
        match &baseline {
            Some(b) => log::info!("📆 Total subgraphs yesterday: {}", b.total_count),
            None => log::info!("📆 Total subgraphs yesterday: unavailable"),
        }

        let snapshot = Snapshot::from_summary(&summary, now);
        match store.write(snapshot_date(now), &snapshot) {
            Ok(path) => {
                log::info!("📁 Saved metrics snapshot to {}", path.display());
                snapshot_path = Some(path);
            }
            Err(e) => log::error!("❌ {}", e),
        }
    } else {
        log::info!(
            "⏩ Skipped metric snapshot creation, not {:02}:00 UTC",
            options.snapshot_hour
        );
    }

    let delta = diff(&summary.counts(), baseline.as_ref(), options.key_scope);
    let input = ReportInput::new(&summary, &delta, now);
    let report_paths = report::write_reports(&options.reports_dir, &input, &report::default_writers())?;

    Ok(RunOutcome::Completed(RunReport {
        networks: summary.networks.len(),
        total: summary.total,
        total_delta: delta.total,
        snapshot_path,
        baseline_found: baseline.is_some(),
        report_paths,
    }))
}
