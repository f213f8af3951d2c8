//! The Graph gateway integration
//!
//! Pages through the network subgraph's `subgraphs` collection, selecting
//! for each subgraph the network of its current deployment and the indexers
//! with an active allocation on it.
//!
//! ## API Reference
//!
//! Endpoint: `{gateway}/{api_key}/subgraphs/id/{subgraph_id}`
//! Method: POST, body `{"query": "<graphql>"}`
//! Returns: `{"data": {"subgraphs": [...]}}` or `{"errors": [...]}`

use super::source::PagedSource;
use super::types::SubgraphRecord;
use crate::config::MetricsConfig;
use crate::error::{PipelineError, PipelineResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Upper bound on allocations returned per deployment
const ALLOCATIONS_PER_DEPLOYMENT: usize = 1000;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<SubgraphsData>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct SubgraphsData {
    #[serde(default)]
    subgraphs: Option<Vec<SubgraphRecord>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// `PagedSource` backed by the gateway's GraphQL endpoint
pub struct GraphGatewaySource {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphGatewaySource {
    pub fn new(endpoint: String, timeout: Duration) -> PipelineResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &MetricsConfig) -> PipelineResult<Self> {
        let endpoint = format!(
            "{}/{}/subgraphs/id/{}",
            config.gateway_url, config.api_key, config.subgraph_id
        );
        Self::new(endpoint, config.request_timeout)
    }
}

/// GraphQL query for one page of subgraphs with a current version
pub fn page_query(offset: usize, page_size: usize) -> String {
    format!(
        r#"{{
    subgraphs(first: {page_size}, skip: {offset}, where: {{ currentVersion_not: null }}) {{
        id
        currentVersion {{
            subgraphDeployment {{
                manifest {{
                    network
                }}
                indexerAllocations(first: {allocations}, where: {{ status: Active }}) {{
                    indexer {{
                        id
                    }}
                }}
            }}
        }}
    }}
}}"#,
        page_size = page_size,
        offset = offset,
        allocations = ALLOCATIONS_PER_DEPLOYMENT,
    )
}

/// Extract the page from a decoded response body
///
/// Missing `data.subgraphs` is an empty page. An `errors` payload without
/// data is treated as a failed request.
fn into_page(response: GraphqlResponse) -> PipelineResult<Vec<SubgraphRecord>> {
    let subgraphs = response.data.and_then(|d| d.subgraphs);

    match (subgraphs, response.errors) {
        (Some(page), errors) => {
            if let Some(errors) = errors.filter(|e| !e.is_empty()) {
                log::warn!("⚠️  Gateway returned data with {} GraphQL error(s)", errors.len());
            }
            Ok(page)
        }
        (None, Some(errors)) if !errors.is_empty() => {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            Err(PipelineError::Transport {
                status: format!("GraphQL error: {}", messages.join("; ")),
            })
        }
        (None, _) => Ok(Vec::new()),
    }
}

#[async_trait]
impl PagedSource for GraphGatewaySource {
    async fn fetch_page(&self, offset: usize, page_size: usize) -> PipelineResult<Vec<SubgraphRecord>> {
        let body = serde_json::json!({ "query": page_query(offset, page_size) });

        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(PipelineError::Transport {
                status: response.status().to_string(),
            });
        }

        let decoded: GraphqlResponse = response.json().await?;
        let page = into_page(decoded)?;

        log::debug!("Fetched {} subgraphs at offset {}", page.len(), offset);
        Ok(page)
    }

    fn source_name(&self) -> &'static str {
        "graph-gateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_paging_arguments() {
        let query = page_query(2000, 1000);
        assert!(query.contains("subgraphs(first: 1000, skip: 2000"));
        assert!(query.contains("currentVersion_not: null"));
        assert!(query.contains("indexerAllocations(first: 1000, where: { status: Active })"));
    }

    #[test]
    fn test_response_with_subgraphs() {
        let response: GraphqlResponse = serde_json::from_str(
            r#"{"data": {"subgraphs": [
                {"id": "1", "currentVersion": {"subgraphDeployment": {
                    "manifest": {"network": "gnosis"},
                    "indexerAllocations": [{"indexer": {"id": "0xa"}}]}}}
            ]}}"#,
        )
        .unwrap();

        let page = into_page(response).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].network(), Some("gnosis"));
    }

    #[test]
    fn test_missing_data_is_end_of_stream() {
        let response: GraphqlResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert!(into_page(response).unwrap().is_empty());

        let response: GraphqlResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(into_page(response).unwrap().is_empty());
    }

    #[test]
    fn test_errors_without_data_fail() {
        let response: GraphqlResponse = serde_json::from_str(
            r#"{"errors": [{"message": "auth error: invalid key"}]}"#,
        )
        .unwrap();

        match into_page(response) {
            Err(PipelineError::Transport { status }) => assert!(status.contains("invalid key")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    /// Answer a single HTTP request on a local port, returning the endpoint
    /// and a handle resolving to the raw request text
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/api/key/subgraphs/id/test", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            String::from_utf8_lossy(&request).into_owned()
        });

        (endpoint, handle)
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let (endpoint, server) = serve_once("HTTP/1.1 502 Bad Gateway", r#"{"error":"upstream"}"#).await;
        let source = GraphGatewaySource::new(endpoint, Duration::from_secs(5)).unwrap();

        match source.fetch_page(0, 100).await {
            Err(PipelineError::Transport { status }) => assert!(status.contains("502")),
            other => panic!("expected transport error, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_subgraph_list_is_empty_page() {
        let (endpoint, server) = serve_once("HTTP/1.1 200 OK", r#"{"data":{"subgraphs":[]}}"#).await;
        let source = GraphGatewaySource::new(endpoint, Duration::from_secs(5)).unwrap();

        let page = source.fetch_page(3000, 1000).await.unwrap();
        assert!(page.is_empty());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/key/subgraphs/id/test "));
        assert!(request.contains("skip: 3000"));
        assert!(request.contains("first: 1000"));
    }

    #[tokio::test]
    #[ignore] // Run only when testing against the live gateway
    async fn test_fetch_first_page() {
        let config = MetricsConfig::from_env().expect("GRAPH_API_KEY must be set");
        let source = GraphGatewaySource::from_config(&config).unwrap();

        let page = source.fetch_page(0, 10).await.unwrap();
        assert!(!page.is_empty());
        assert!(page.len() <= 10);
    }
}
