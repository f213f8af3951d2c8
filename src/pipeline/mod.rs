//! # Network Metrics Pipeline
//!
//! Fetch-aggregate-diff core of the daily job:
//!
//! ```text
//! PagedSource (GraphGatewaySource)
//!     ↓  pages until an empty one
//! aggregate → NetworkSummary (count + distinct indexers per network)
//!     ↓
//! SnapshotStore (read yesterday, write today within the snapshot hour)
//!     ↓
//! diff → Delta (per network + total, absent without a baseline)
//!     ↓
//! report writers (CSV / JSON / HTML)
//! ```
//!
//! `aggregate` and `diff` are pure with respect to their inputs; whether a
//! snapshot is persisted is decided by `schedule::should_persist_snapshot`
//! from an explicit clock reading.

pub mod aggregator;
pub mod diff;
pub mod gateway;
pub mod runner;
pub mod schedule;
pub mod snapshot;
pub mod source;
pub mod types;

pub use aggregator::{aggregate, NetworkAccumulator};
pub use diff::{diff, Delta, KeyScope};
pub use gateway::GraphGatewaySource;
pub use runner::{run_once, RunOptions, RunOutcome, RunReport};
pub use snapshot::{FileSnapshotStore, Snapshot, SnapshotStore};
pub use source::PagedSource;
pub use types::{KeySummary, NetworkSummary, SubgraphRecord};
