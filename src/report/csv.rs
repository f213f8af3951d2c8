//! CSV report: one row per network, highest subgraph count first

use super::{with_thousands, ReportInput, ReportWriter};

pub const HEADER: [&str; 3] = ["Network", "Subgraph Count", "Unique Indexers"];

pub struct CsvReport;

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Append one RFC 4180 row (CRLF-terminated) to `out`
fn push_row<S: AsRef<str>>(out: &mut String, row: &[S]) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push_str("\r\n");
}

impl ReportWriter for CsvReport {
    fn file_name(&self) -> &'static str {
        "network_subgraph_counts.csv"
    }

    fn render(&self, input: &ReportInput) -> String {
        let mut out = String::new();
        push_row(&mut out, &HEADER);

        for row in &input.rows {
            push_row(
                &mut out,
                &[
                    row.display_name(),
                    with_thousands(row.count),
                    row.distinct_count.to_string(),
                ],
            );
        }

        out
    }

    fn format_name(&self) -> &'static str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportRow;
    use chrono::Utc;

    fn row(key: &str, count: u64, distinct_count: u64) -> ReportRow {
        ReportRow {
            key: key.to_string(),
            count,
            distinct_count,
            delta: None,
        }
    }

    #[test]
    fn test_render_rows() {
        let input = ReportInput {
            generated_at: Utc::now(),
            rows: vec![row("mainnet", 4211, 120), row("arbitrum-one", 980, 88), row("matic", 12, 3)],
            total: 5203,
            total_delta: None,
        };

        let csv = CsvReport.render(&input);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Network,Subgraph Count,Unique Indexers");
        assert_eq!(lines[1], "Ethereum (Mainnet),\"4,211\",120");
        assert_eq!(lines[2], "Arbitrum-One,980,88");
        assert_eq!(lines[3], "Polygon (Matic),12,3");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_quotes_embedded_quotes() {
        let mut out = String::new();
        push_row(&mut out, &["say \"hi\"", "plain"]);
        assert_eq!(out, "\"say \"\"hi\"\"\",plain\r\n");
    }
}
