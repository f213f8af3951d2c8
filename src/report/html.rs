//! HTML dashboard: sortable table of networks with 24h variation

use super::{signed_with_thousands, with_thousands, ReportInput, ReportRow, ReportWriter};

pub const DASHBOARD_VERSION: &str = env!("CARGO_PKG_VERSION");

const PLACEHOLDER_LOGO: &str = "images/placeholder_logo.png";

/// Networks with a logo under `images/`, and the logo file when it differs from the key
const NETWORK_LOGOS: &[(&str, Option<&str>)] = &[
    ("abstract", None),
    ("arbitrum-nova", None),
    ("arbitrum-one", Some("arbitrum")),
    ("aurora", None),
    ("avalanche", None),
    ("base", None),
    ("berachain", None),
    ("blast", None),
    ("boba", None),
    ("bsc", None),
    ("celo", None),
    ("chiliz", None),
    ("corn", None),
    ("eos", None),
    ("etherlink", None),
    ("fantom", None),
    ("fraxtal", None),
    ("fuji", None),
    ("fuse", None),
    ("gnosis", None),
    ("harmony", None),
    ("hemi", None),
    ("injective", None),
    ("ink", None),
    ("iotex", None),
    ("kaia", None),
    ("kroma", None),
    ("kylin", None),
    ("lens", None),
    ("lens-2", None),
    ("linea", None),
    ("mainnet", Some("ethereum")),
    ("mantle", None),
    ("matic", Some("polygon")),
    ("monad", None),
    ("moonbeam", None),
    ("near", None),
    ("optimism", None),
    ("polygon-zkevm", None),
    ("redstone", None),
    ("rootstock", None),
    ("scroll", None),
    ("sei", None),
    ("sepolia", None),
    ("soneium", None),
    ("sonic", Some("abstract")),
    ("unichain", None),
    ("vana", None),
    ("wax", None),
    ("zkfair", None),
    ("zksync-era", None),
    ("zetachain", None),
];

/// Relative logo path for a network, placeholder when unknown
pub fn logo_path(key: &str) -> String {
    let key = key.to_lowercase();
    NETWORK_LOGOS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(name, file)| format!("images/{}.png", file.unwrap_or(*name)))
        .unwrap_or_else(|| PLACEHOLDER_LOGO.to_string())
}

/// Escape text for element content and quoted attribute values
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Encode a network key for a query string value
fn encode_query_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(byte as char),
            _ => {
                out.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    out
}

/// Cell content and sort value for a delta
fn delta_cell(delta: Option<i64>) -> (String, String) {
    match delta {
        None => ("<span class=\"na\">N/A</span>".to_string(), String::new()),
        Some(d) if d > 0 => (
            format!("<span class=\"up\">{}</span>", signed_with_thousands(d)),
            d.to_string(),
        ),
        Some(d) if d < 0 => (
            format!("<span class=\"down\">{}</span>", signed_with_thousands(d)),
            d.to_string(),
        ),
        Some(_) => ("0".to_string(), "0".to_string()),
    }
}

fn push_row(out: &mut String, row: &ReportRow) {
    let key = escape(&row.key);
    let (delta_html, delta_value) = delta_cell(row.delta);

    out.push_str(&format!(
        r#"
            <tr>
                <td><img src="{logo}" alt="{key}" class="logo" /><a href="https://thegraph.com/explorer?indexedNetwork={query}&amp;orderBy=Query+Count&amp;orderDirection=desc" target="_blank">{name}</a></td>
                <td data-value="{count}">{count_fmt}</td>
                <td data-value="{delta_value}">{delta_html}</td>
                <td data-value="{distinct}">{distinct}</td>
            </tr>"#,
        logo = escape(&logo_path(&row.key)),
        key = key,
        query = encode_query_value(&row.key),
        name = escape(&row.display_name()),
        count = row.count,
        count_fmt = with_thousands(row.count),
        delta_value = delta_value,
        delta_html = delta_html,
        distinct = row.distinct_count,
    ));
}

const STYLE: &str = r#"
        :root { --bg: #111; --fg: #fff; --table-bg: #1e1e1e; --header-bg: #333; --row-border: rgba(255, 255, 255, 0.08); }
        .light-mode { --bg: #f0f2f5; --fg: #000; --table-bg: #fff; --header-bg: #ddd; --row-border: rgba(0, 0, 0, 0.3); }
        body { background: var(--bg); color: var(--fg); font-family: Arial, sans-serif; padding: 10px 20px 20px; }
        h1 { text-align: center; margin-bottom: 4px; }
        .generated { text-align: center; font-size: 0.8em; margin-bottom: 30px; }
        .summary { display: flex; justify-content: space-between; max-width: 600px; margin: 0 auto 10px; color: #4CAF50; }
        .wrapper { overflow-x: auto; max-width: 600px; margin: 0 auto; }
        table { width: 100%; border-collapse: separate; border-spacing: 0; background: var(--table-bg); border-radius: 12px; overflow: hidden; }
        th, td { padding: 8px 12px; text-align: left; }
        td { border-bottom: 1px solid var(--row-border); }
        th { background: var(--header-bg); cursor: pointer; }
        a { color: var(--fg); text-decoration: none; }
        .logo { width: 18px; height: 18px; vertical-align: middle; margin-right: 6px; }
        .up { color: #4CAF50; font-size: 0.85em; }
        .down { color: #f44336; font-size: 0.85em; }
        .na { opacity: 0.5; font-size: 0.85em; }
"#;

const SCRIPT: &str = r#"
        function sortTable(column) {
            const table = document.getElementById("networkTable");
            const header = table.rows[0].cells[column];
            const direction = header.dataset.sortDirection === "desc" ? "asc" : "desc";
            const rows = Array.from(table.rows).slice(1);
            rows.sort((a, b) => {
                const av = a.cells[column].dataset.value ?? a.cells[column].innerText.toLowerCase();
                const bv = b.cells[column].dataset.value ?? b.cells[column].innerText.toLowerCase();
                const an = parseFloat(av), bn = parseFloat(bv);
                const cmp = (!isNaN(an) && !isNaN(bn)) ? an - bn : String(av).localeCompare(String(bv));
                return direction === "asc" ? cmp : -cmp;
            });
            rows.forEach(row => table.tBodies[0].appendChild(row));
            header.dataset.sortDirection = direction;
        }
        function toggleTheme() {
            document.body.classList.toggle("light-mode");
        }
"#;

pub struct HtmlReport;

impl ReportWriter for HtmlReport {
    fn file_name(&self) -> &'static str {
        "index.html"
    }

    fn render(&self, input: &ReportInput) -> String {
        let since_yesterday = input
            .total_delta
            .map(|d| format!(" ({} since yesterday)", signed_with_thousands(d)))
            .unwrap_or_default();

        let mut out = String::new();
        out.push_str(&format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Subgraphs Network Dashboard</title>
    <style>{style}</style>
</head>
<body>
    <div style="text-align: right;"><label><input type="checkbox" onclick="toggleTheme()"> Light mode</label></div>
    <h1>Subgraphs Network Dashboard</h1>
    <div class="generated">Generated on: {generated} - v{version}</div>
    <div class="summary">
        <div><strong>Total Subgraphs:</strong> {total}{since}</div>
        <a href="network_subgraph_counts.csv" download>Download CSV</a>
    </div>
    <div class="wrapper">
        <table id="networkTable">
            <tr>
                <th onclick="sortTable(0)">Network</th>
                <th onclick="sortTable(1)" data-sort-direction="desc" title="Total number of subgraphs currently deployed on this network">Subgraph Count</th>
                <th onclick="sortTable(2)" title="Change in subgraph count compared to the previous day">Var (24h)</th>
                <th onclick="sortTable(3)" title="Number of unique indexers actively allocating to this network">Unique Indexers</th>
            </tr>"#,
            style = STYLE,
            generated = input.generated_at.format("%Y-%m-%d %H:%M UTC"),
            version = DASHBOARD_VERSION,
            total = with_thousands(input.total),
            since = since_yesterday,
        ));

        for row in &input.rows {
            push_row(&mut out, row);
        }

        out.push_str(&format!(
            r#"
        </table>
    </div>
    <script>{script}</script>
</body>
</html>
"#,
            script = SCRIPT,
        ));

        out
    }

    fn format_name(&self) -> &'static str {
        "HTML"
    }
}
