//! JSON report for machine consumers

use super::{ReportInput, ReportWriter};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonNetwork<'a> {
    network: &'a str,
    display_name: String,
    subgraph_count: u64,
    unique_indexers: u64,
    delta: Option<i64>,
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    generated_at: String,
    total_subgraphs: u64,
    total_delta: Option<i64>,
    networks: Vec<JsonNetwork<'a>>,
}

pub struct JsonReport;

impl ReportWriter for JsonReport {
    fn file_name(&self) -> &'static str {
        "network_subgraph_counts.json"
    }

    fn render(&self, input: &ReportInput) -> String {
        let document = JsonDocument {
            generated_at: input.generated_at.to_rfc3339(),
            total_subgraphs: input.total,
            total_delta: input.total_delta,
            networks: input
                .rows
                .iter()
                .map(|row| JsonNetwork {
                    network: &row.key,
                    display_name: row.display_name(),
                    subgraph_count: row.count,
                    unique_indexers: row.distinct_count,
                    delta: row.delta,
                })
                .collect(),
        };

        // Only strings, integers and options: serialization cannot fail
        serde_json::to_string_pretty(&document).unwrap_or_default()
    }

    fn format_name(&self) -> &'static str {
        "JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportRow;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_absent_deltas_are_null() {
        let input = ReportInput {
            generated_at: Utc.with_ymd_and_hms(2025, 5, 14, 8, 0, 0).unwrap(),
            rows: vec![ReportRow {
                key: "mainnet".to_string(),
                count: 10,
                distinct_count: 4,
                delta: None,
            }],
            total: 10,
            total_delta: None,
        };

        let value: serde_json::Value = serde_json::from_str(&JsonReport.render(&input)).unwrap();
        assert_eq!(value["generated_at"], "2025-05-14T08:00:00+00:00");
        assert_eq!(value["total_subgraphs"], 10);
        assert!(value["total_delta"].is_null());
        assert_eq!(value["networks"][0]["display_name"], "Ethereum (Mainnet)");
        assert_eq!(value["networks"][0]["unique_indexers"], 4);
        assert!(value["networks"][0]["delta"].is_null());
    }

    #[test]
    fn test_zero_delta_is_not_null() {
        let input = ReportInput {
            generated_at: Utc::now(),
            rows: vec![ReportRow {
                key: "base".to_string(),
                count: 3,
                distinct_count: 1,
                delta: Some(0),
            }],
            total: 3,
            total_delta: Some(0),
        };

        let value: serde_json::Value = serde_json::from_str(&JsonReport.render(&input)).unwrap();
        assert_eq!(value["networks"][0]["delta"], 0);
        assert_eq!(value["total_delta"], 0);
    }
}
