//! Daily snapshot persistence
//!
//! One JSON file per UTC calendar day under the metrics directory:
//!
//! ```text
//! reports/metrics/metric_20250514.json
//! {
//!   "timestamp": "2025-05-14 08:00:12 UTC",
//!   "total_subgraphs": 11873,
//!   "networks": { "mainnet": 4211, "arbitrum-one": 1530, ... }
//! }
//! ```
//!
//! Only subgraph counts are stored; indexer counts are reported for the
//! current run and never diffed.

use super::types::NetworkSummary;
use crate::error::{PipelineError, PipelineResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "metric_";
const FILE_EXTENSION: &str = ".json";

/// Immutable dated aggregate used as the day-over-day baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredSnapshot")]
pub struct Snapshot {
    #[serde(rename = "timestamp", with = "utc_timestamp")]
    pub captured_at: DateTime<Utc>,
    #[serde(rename = "total_subgraphs")]
    pub total_count: u64,
    #[serde(rename = "networks", default)]
    pub totals: BTreeMap<String, u64>,
}

impl Snapshot {
    pub fn new(captured_at: DateTime<Utc>, totals: BTreeMap<String, u64>) -> Self {
        let total_count = totals.values().sum();
        Self {
            captured_at,
            total_count,
            totals,
        }
    }

    pub fn from_summary(summary: &NetworkSummary, captured_at: DateTime<Utc>) -> Self {
        Self {
            captured_at,
            total_count: summary.total,
            totals: summary.counts(),
        }
    }
}

/// On-disk shape accepted when reading; older files may omit the total
#[derive(Deserialize)]
struct StoredSnapshot {
    #[serde(with = "utc_timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    total_subgraphs: Option<u64>,
    #[serde(default)]
    networks: BTreeMap<String, u64>,
}

impl From<StoredSnapshot> for Snapshot {
    fn from(stored: StoredSnapshot) -> Self {
        match stored.total_subgraphs {
            Some(total_count) => Self {
                captured_at: stored.timestamp,
                total_count,
                totals: stored.networks,
            },
            None => Self::new(stored.timestamp, stored.networks),
        }
    }
}

/// Persisted timestamp format: `YYYY-MM-DD HH:MM:SS UTC`
mod utc_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;

        if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, FORMAT) {
            return Ok(naive.and_utc());
        }

        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}

/// Storage for one snapshot per calendar day
pub trait SnapshotStore: Send + Sync {
    /// Persist `snapshot` as the snapshot for `date`, replacing any earlier one
    fn write(&self, date: NaiveDate, snapshot: &Snapshot) -> PipelineResult<PathBuf>;

    /// Snapshot for `date`, `Ok(None)` when none was taken that day
    fn read(&self, date: NaiveDate) -> PipelineResult<Option<Snapshot>>;
}

/// `SnapshotStore` over a directory of JSON files
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn day_prefix(date: NaiveDate) -> String {
        format!("{}{}", FILE_PREFIX, date.format("%Y%m%d"))
    }

    /// Path written for `date`
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}{}", Self::day_prefix(date), FILE_EXTENSION))
    }

    /// File holding the snapshot for `date`, if any
    ///
    /// Prefers the canonical `metric_YYYYMMDD.json`; otherwise the
    /// lexicographically first `metric_YYYYMMDD*.json` (older runs wrote a
    /// `_HHMMSS` suffix).
    fn locate(&self, date: NaiveDate) -> PipelineResult<Option<PathBuf>> {
        let exact = self.path_for(date);
        if exact.is_file() {
            return Ok(Some(exact));
        }

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PipelineError::SnapshotRead {
                    path: self.dir.clone(),
                    reason: e.to_string(),
                })
            }
        };

        let prefix = Self::day_prefix(date);
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.starts_with(&prefix) && name.ends_with(FILE_EXTENSION)
            })
            .map(|entry| entry.path())
            .collect();

        candidates.sort();
        Ok(candidates.into_iter().next())
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn write(&self, date: NaiveDate, snapshot: &Snapshot) -> PipelineResult<PathBuf> {
        let path = self.path_for(date);
        let write_err = |source| PipelineError::SnapshotWrite {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;

        log::debug!("Saved snapshot with {} networks to {}", snapshot.totals.len(), path.display());
        Ok(path)
    }

    fn read(&self, date: NaiveDate) -> PipelineResult<Option<Snapshot>> {
        let path = match self.locate(date)? {
            Some(path) => path,
            None => return Ok(None),
        };

        let read_err = |reason: String| PipelineError::SnapshotRead {
            path: path.clone(),
            reason,
        };

        let json = fs::read_to_string(&path).map_err(|e| read_err(e.to_string()))?;
        let snapshot: Snapshot = serde_json::from_str(&json).map_err(|e| read_err(e.to_string()))?;

        log::debug!("Loaded snapshot from {}", path.display());
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(hour: u32) -> Snapshot {
        let totals = BTreeMap::from([("mainnet".to_string(), 10), ("base".to_string(), 4)]);
        Snapshot::new(Utc.with_ymd_and_hms(2025, 5, 14, hour, 0, 5).unwrap(), totals)
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("metrics"));
        let snapshot = sample(8);

        let path = store.write(date(2025, 5, 14), &snapshot).unwrap();
        assert!(path.ends_with("metric_20250514.json"));

        let loaded = store.read(date(2025, 5, 14)).unwrap().unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.total_count, 14);
    }

    #[test]
    fn test_missing_day_is_absent() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        store.write(date(2025, 5, 14), &sample(8)).unwrap();

        assert_eq!(store.read(date(2025, 5, 13)).unwrap(), None);

        let missing_dir = FileSnapshotStore::new(dir.path().join("does-not-exist"));
        assert_eq!(missing_dir.read(date(2025, 5, 13)).unwrap(), None);
    }

    #[test]
    fn test_second_write_same_day_overwrites() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());

        store.write(date(2025, 5, 14), &sample(8)).unwrap();
        let later = sample(9);
        store.write(date(2025, 5, 14), &later).unwrap();

        assert_eq!(store.read(date(2025, 5, 14)).unwrap(), Some(later));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_reads_timestamped_files_first_by_name() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("metric_20250513_081500.json"),
            r#"{"timestamp": "2025-05-13 08:15:00 UTC", "total_subgraphs": 7, "networks": {"gnosis": 7}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("metric_20250513_080200.json"),
            r#"{"timestamp": "2025-05-13 08:02:00 UTC", "total_subgraphs": 5, "networks": {"gnosis": 5}}"#,
        )
        .unwrap();

        let store = FileSnapshotStore::new(dir.path());
        let loaded = store.read(date(2025, 5, 13)).unwrap().unwrap();
        assert_eq!(loaded.total_count, 5);
        assert_eq!(
            loaded.captured_at,
            Utc.with_ymd_and_hms(2025, 5, 13, 8, 2, 0).unwrap()
        );
    }

    #[test]
    fn test_corrupt_file_is_read_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("metric_20250513.json"), "{ not json").unwrap();

        let store = FileSnapshotStore::new(dir.path());
        assert!(matches!(
            store.read(date(2025, 5, 13)),
            Err(PipelineError::SnapshotRead { .. })
        ));
    }

    #[test]
    fn test_missing_total_is_sum_of_networks() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("metric_20250513.json"),
            r#"{"timestamp": "2025-05-13 08:00:00 UTC", "networks": {"gnosis": 7, "base": 3}}"#,
        )
        .unwrap();

        let store = FileSnapshotStore::new(dir.path());
        let loaded = store.read(date(2025, 5, 13)).unwrap().unwrap();
        assert_eq!(loaded.total_count, 10);
        assert_eq!(loaded.totals.get("gnosis"), Some(&7));
    }

    #[test]
    fn test_persisted_field_names() {
        let json = serde_json::to_value(sample(8)).unwrap();
        assert_eq!(json["timestamp"], "2025-05-14 08:00:05 UTC");
        assert_eq!(json["total_subgraphs"], 14);
        assert_eq!(json["networks"]["mainnet"], 10);
        assert!(json.get("distinct_count").is_none());
    }
}
