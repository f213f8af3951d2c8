//! Paged record source trait
//!
//! Abstracts "fetch page N" against the remote service. Implementations know
//! nothing about aggregation; an empty page is the end-of-stream signal.

use super::types::SubgraphRecord;
use crate::error::PipelineResult;
use async_trait::async_trait;

#[async_trait]
pub trait PagedSource: Send + Sync {
    /// Fetch up to `page_size` records starting at `offset`
    ///
    /// Returns `PipelineError::Transport`/`Http` when the remote call does not
    /// succeed. An empty vector means there are no more records.
    async fn fetch_page(&self, offset: usize, page_size: usize) -> PipelineResult<Vec<SubgraphRecord>>;

    /// Source name for logging
    fn source_name(&self) -> &'static str;
}
