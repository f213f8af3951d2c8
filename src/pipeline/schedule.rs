//! Snapshot timing policy
//!
//! The job itself runs on an external schedule (cron or similar). These
//! helpers decide, from an explicit clock reading, whether this invocation
//! persists the day's snapshot and which day is the baseline.

use chrono::{DateTime, Days, NaiveDate, Timelike, Utc};

/// True when `now` falls inside the configured snapshot hour (UTC)
pub fn should_persist_snapshot(now: DateTime<Utc>, snapshot_hour: u32) -> bool {
    now.hour() == snapshot_hour
}

/// Calendar day a snapshot taken at `now` is filed under
pub fn snapshot_date(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// Calendar day whose snapshot is the baseline for a run at `now`
pub fn baseline_date(now: DateTime<Utc>) -> NaiveDate {
    let today = snapshot_date(now);
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}
