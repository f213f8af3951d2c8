//! Daily per-network subgraph metrics for The Graph Network
//!
//! Counts subgraphs and unique active indexers per network, keeps a daily
//! snapshot, and publishes CSV/JSON/HTML reports with day-over-day changes.

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;

pub use config::MetricsConfig;
pub use error::{PipelineError, PipelineResult};
