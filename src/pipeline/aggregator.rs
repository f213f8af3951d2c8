//! Per-network aggregation over the full paginated stream
//!
//! `NetworkAccumulator` holds the in-flight state for one run (counts and
//! distinct indexer sets per network). It is created per call to
//! `aggregate`, so runs never share state.

use super::source::PagedSource;
use super::types::{KeySummary, NetworkSummary, SubgraphRecord};
use crate::config::ConfigError;
use crate::error::PipelineResult;
use std::collections::{HashMap, HashSet};

/// In-progress accumulation for one pipeline run
#[derive(Debug, Default)]
pub struct NetworkAccumulator {
    /// Subgraphs seen per network
    counts: HashMap<String, u64>,
    /// Indexer ids seen per network, deduplicated across pages
    indexers: HashMap<String, HashSet<String>>,
    /// Records dropped for lack of a network
    skipped: u64,
}

impl NetworkAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the accumulator
    ///
    /// Records without a network are counted as skipped and contribute nothing.
    pub fn add_record(&mut self, record: &SubgraphRecord) {
        let network = match record.network() {
            Some(network) => network,
            None => {
                self.skipped += 1;
                return;
            }
        };

        *self.counts.entry(network.to_string()).or_insert(0) += 1;

        let ids = self.indexers.entry(network.to_string()).or_default();
        for id in record.indexer_ids() {
            ids.insert(id.to_string());
        }
    }

    pub fn add_page(&mut self, page: &[SubgraphRecord]) {
        for record in page {
            self.add_record(record);
        }
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Materialise the per-network summaries
    pub fn finish(self) -> NetworkSummary {
        let mut summary = NetworkSummary::default();

        for (network, count) in self.counts {
            let distinct_count = self
                .indexers
                .get(&network)
                .map(|ids| ids.len() as u64)
                .unwrap_or(0);

            summary.total += count;
            summary.networks.insert(
                network.clone(),
                KeySummary {
                    key: network,
                    count,
                    distinct_count,
                },
            );
        }

        summary
    }
}

/// Page through `source` until an empty page and aggregate every record
///
/// Pages are fetched strictly one after another, `offset` advancing by
/// `page_size`. Any fetch failure aborts the whole run; no partial summary is
/// returned. A zero `page_size` is rejected before any fetch.
pub async fn aggregate<S>(source: &S, page_size: usize) -> PipelineResult<NetworkSummary>
where
    S: PagedSource + ?Sized,
{
    if page_size == 0 {
        return Err(ConfigError::InvalidValue("page size must be positive".to_string()).into());
    }

    let mut accumulator = NetworkAccumulator::new();
    let mut offset = 0usize;
    let mut pages = 0u64;

    loop {
        let page = source.fetch_page(offset, page_size).await?;
        if page.is_empty() {
            break;
        }

        accumulator.add_page(&page);
        pages += 1;
        offset += page_size;
    }

    let skipped = accumulator.skipped();
    let summary = accumulator.finish();

    if skipped > 0 {
        log::debug!("Skipped {} subgraphs without a manifest network", skipped);
    }
    log::info!(
        "📊 Fetched subgraph and indexer counts for {} networks ({} subgraphs, {} pages from {})",
        summary.networks.len(),
        summary.total,
        pages,
        source.source_name()
    );

    Ok(summary)
}
