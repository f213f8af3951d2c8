//! Report rendering
//!
//! Each `ReportWriter` turns a `ReportInput` into one file in the reports
//! directory. The set is staged before any file is replaced so a failed
//! write leaves the previous reports in place.
//!
//! ```text
//! NetworkSummary + Delta → ReportInput → CsvReport  → network_subgraph_counts.csv
//!                                      → JsonReport → network_subgraph_counts.json
//!                                      → HtmlReport → index.html
//! ```

pub mod csv;
pub mod html;
pub mod json;

pub use self::csv::CsvReport;
pub use self::html::HtmlReport;
pub use self::json::JsonReport;

use crate::pipeline::diff::Delta;
use crate::pipeline::types::NetworkSummary;
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One table row: a network and its numbers for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub key: String,
    pub count: u64,
    pub distinct_count: u64,
    /// `None` when there is no baseline (rendered as N/A)
    pub delta: Option<i64>,
}

impl ReportRow {
    pub fn display_name(&self) -> String {
        display_name(&self.key)
    }
}

/// Everything a renderer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportInput {
    pub generated_at: DateTime<Utc>,
    /// Sorted by count descending, ties by key
    pub rows: Vec<ReportRow>,
    pub total: u64,
    pub total_delta: Option<i64>,
}

impl ReportInput {
    /// Rows for every network in `summary`, plus zero-count rows for networks
    /// that only appear in `delta` (dropped since yesterday, union scope)
    pub fn new(summary: &NetworkSummary, delta: &Delta, generated_at: DateTime<Utc>) -> Self {
        let mut rows: Vec<ReportRow> = summary
            .sorted_desc()
            .into_iter()
            .map(|s| ReportRow {
                key: s.key.clone(),
                count: s.count,
                distinct_count: s.distinct_count,
                delta: delta.for_key(&s.key),
            })
            .collect();

        if let Some(per_key) = &delta.per_key {
            // BTreeMap order keeps dropped networks sorted by key
            for (key, &d) in per_key {
                if summary.get(key).is_none() {
                    rows.push(ReportRow {
                        key: key.clone(),
                        count: 0,
                        distinct_count: 0,
                        delta: Some(d),
                    });
                }
            }
        }

        Self {
            generated_at,
            rows,
            total: summary.total,
            total_delta: delta.total,
        }
    }
}

/// A report format
pub trait ReportWriter {
    /// File name inside the reports directory
    fn file_name(&self) -> &'static str;

    fn render(&self, input: &ReportInput) -> String;

    /// Format name for logging
    fn format_name(&self) -> &'static str;
}

/// Render every writer into `dir`, returning the written paths
///
/// All bodies are rendered and staged as `.tmp` files before any report is
/// replaced, so a failed write leaves the previous set untouched.
pub fn write_reports(dir: &Path, input: &ReportInput, writers: &[&dyn ReportWriter]) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(writers.len());
    for writer in writers {
        let path = dir.join(writer.file_name());
        let tmp = tmp_path(&path);

        if let Err(e) = fs::write(&tmp, writer.render(input)) {
            for (_, tmp) in &staged {
                if let Err(cleanup) = fs::remove_file(tmp) {
                    log::warn!("⚠️  Could not remove {}: {}", tmp.display(), cleanup);
                }
            }
            return Err(e);
        }
        staged.push((path, tmp));
    }

    let mut written = Vec::with_capacity(staged.len());
    for ((path, tmp), writer) in staged.into_iter().zip(writers) {
        fs::rename(&tmp, &path)?;
        log::info!("📝 Saved {} report to {}", writer.format_name(), path.display());
        written.push(path);
    }

    Ok(written)
}

/// The default report set: CSV, JSON and HTML
pub fn default_writers() -> [&'static dyn ReportWriter; 3] {
    [&CsvReport, &JsonReport, &HtmlReport]
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Human-readable network name
///
/// `mainnet` and `matic` get their chain names; everything else is title-cased.
pub fn display_name(key: &str) -> String {
    match key.to_lowercase().as_str() {
        "mainnet" => "Ethereum (Mainnet)".to_string(),
        "matic" => "Polygon (Matic)".to_string(),
        _ => title_case(key),
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;

    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }

    out
}

/// `1234567` → `1,234,567`
pub fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Signed delta with thousands separators: `+1,204`, `-3`, `0`
pub fn signed_with_thousands(n: i64) -> String {
    let magnitude = with_thousands(n.unsigned_abs());
    match n {
        n if n > 0 => format!("+{}", magnitude),
        n if n < 0 => format!("-{}", magnitude),
        _ => magnitude,
    }
}
