//! Scripted in-memory `PagedSource` shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use network_metrics::pipeline::{PagedSource, SubgraphRecord};
use network_metrics::{PipelineError, PipelineResult};
use std::sync::Mutex;

/// Serves pre-built pages by `offset / page_size`, then empty pages
pub struct ScriptedSource {
    pages: Vec<Vec<SubgraphRecord>>,
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<(usize, usize)>>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<Vec<SubgraphRecord>>) -> Self {
        Self {
            pages,
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail with a transport error on the `n`th call (0-based)
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// `(offset, page_size)` of every call so far
    pub fn calls(&self) -> Vec<(usize, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PagedSource for ScriptedSource {
    async fn fetch_page(&self, offset: usize, page_size: usize) -> PipelineResult<Vec<SubgraphRecord>> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((offset, page_size));
            calls.len() - 1
        };

        if self.fail_on_call == Some(call) {
            return Err(PipelineError::Transport {
                status: "502 Bad Gateway".to_string(),
            });
        }

        Ok(self.pages.get(offset / page_size).cloned().unwrap_or_default())
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

pub fn record(network: &str, indexers: &[&str]) -> SubgraphRecord {
    SubgraphRecord::new(Some(network), indexers)
}

pub fn keyless(indexers: &[&str]) -> SubgraphRecord {
    SubgraphRecord::new(None, indexers)
}
