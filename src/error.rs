//! Error taxonomy for a metrics run
//!
//! Fatal: `Transport`, `Http`, `Config`. The orchestrator downgrades
//! `SnapshotRead` to "no baseline" and `SnapshotWrite` to an error log;
//! reporting continues in both cases.

use crate::config::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Gateway answered, but not with a usable page
    #[error("gateway request failed: {status}")]
    Transport { status: String },

    #[error("gateway connection failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("snapshot {} unreadable: {reason}", .path.display())]
    SnapshotRead { path: PathBuf, reason: String },

    #[error("snapshot {} not written: {source}", .path.display())]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("report output failed: {0}")]
    Report(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Whether this error must abort the run before anything is published
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::Transport { .. } | PipelineError::Http(_) | PipelineError::Config(_)
        )
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
