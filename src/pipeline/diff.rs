//! Day-over-day deltas against the previous snapshot

use super::snapshot::Snapshot;
use std::collections::BTreeMap;

/// Which keys receive a per-network delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyScope {
    /// Only networks present today
    #[default]
    Today,
    /// Today's networks plus those only present yesterday (reported as a drop)
    Union,
}

impl KeyScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "today" => Some(KeyScope::Today),
            "union" => Some(KeyScope::Union),
            _ => None,
        }
    }
}

/// Deltas for one run
///
/// `per_key` and `total` are both `None` when there is no baseline, which
/// is distinct from a computed delta of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub per_key: Option<BTreeMap<String, i64>>,
    pub total: Option<i64>,
}

impl Delta {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.per_key.is_none() && self.total.is_none()
    }

    /// Delta for `key`; `None` without a baseline or for keys outside the scope
    pub fn for_key(&self, key: &str) -> Option<i64> {
        self.per_key.as_ref().and_then(|m| m.get(key).copied())
    }
}

/// Compare today's counts with yesterday's snapshot
///
/// Missing keys in yesterday count as zero. The total delta is computed from
/// the two totals, not by summing per-key deltas.
pub fn diff(today: &BTreeMap<String, u64>, yesterday: Option<&Snapshot>, scope: KeyScope) -> Delta {
    let yesterday = match yesterday {
        Some(snapshot) => snapshot,
        None => return Delta::absent(),
    };

    let mut per_key: BTreeMap<String, i64> = today
        .iter()
        .map(|(key, &count)| {
            let before = yesterday.totals.get(key).copied().unwrap_or(0);
            (key.clone(), count as i64 - before as i64)
        })
        .collect();

    if scope == KeyScope::Union {
        for (key, &before) in &yesterday.totals {
            if !today.contains_key(key) {
                per_key.insert(key.clone(), -(before as i64));
            }
        }
    }

    let today_total: u64 = today.values().sum();

    Delta {
        per_key: Some(per_key),
        total: Some(today_total as i64 - yesterday.total_count as i64),
    }
}
