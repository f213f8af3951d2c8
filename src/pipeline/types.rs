//! Record and summary types for the network metrics pipeline
//!
//! `SubgraphRecord` mirrors the GraphQL selection issued by the gateway
//! source. Every level is optional because the gateway returns `null` for
//! subgraphs without a deployed version or manifest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One subgraph entry from a page of the network subgraph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub current_version: Option<CurrentVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentVersion {
    #[serde(default)]
    pub subgraph_deployment: Option<SubgraphDeployment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphDeployment {
    #[serde(default)]
    pub manifest: Option<Manifest>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub indexer_allocations: Vec<IndexerAllocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexerAllocation {
    #[serde(default)]
    pub indexer: Option<Indexer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Indexer {
    #[serde(default)]
    pub id: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<IndexerAllocation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<IndexerAllocation>>::deserialize(deserializer)?.unwrap_or_default())
}

impl SubgraphRecord {
    /// Build a record with a network and a set of allocating indexers
    pub fn new(network: Option<&str>, indexer_ids: &[&str]) -> Self {
        let allocations = indexer_ids
            .iter()
            .map(|id| IndexerAllocation {
                indexer: Some(Indexer {
                    id: Some(id.to_string()),
                }),
            })
            .collect();

        Self {
            id: None,
            current_version: Some(CurrentVersion {
                subgraph_deployment: Some(SubgraphDeployment {
                    manifest: Some(Manifest {
                        network: network.map(str::to_string),
                    }),
                    indexer_allocations: allocations,
                }),
            }),
        }
    }

    fn deployment(&self) -> Option<&SubgraphDeployment> {
        self.current_version
            .as_ref()
            .and_then(|v| v.subgraph_deployment.as_ref())
    }

    /// Grouping key: the network named in the deployment manifest
    ///
    /// Returns `None` when any level of the path is missing or the name is empty.
    pub fn network(&self) -> Option<&str> {
        self.deployment()
            .and_then(|d| d.manifest.as_ref())
            .and_then(|m| m.network.as_deref())
            .filter(|n| !n.is_empty())
    }

    /// Ids of indexers with an active allocation on this deployment
    pub fn indexer_ids(&self) -> impl Iterator<Item = &str> {
        self.deployment()
            .into_iter()
            .flat_map(|d| d.indexer_allocations.iter())
            .filter_map(|a| a.indexer.as_ref())
            .filter_map(|i| i.id.as_deref())
    }
}

/// Per-network result of one aggregation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySummary {
    pub key: String,
    /// Subgraphs whose current deployment targets this network
    pub count: u64,
    /// Distinct indexers allocating to any of those deployments
    pub distinct_count: u64,
}

/// Result of aggregating the full paginated stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSummary {
    pub networks: BTreeMap<String, KeySummary>,
    pub total: u64,
}

impl NetworkSummary {
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&KeySummary> {
        self.networks.get(key)
    }

    /// Per-network subgraph counts (the part that is diffed across days)
    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.networks
            .iter()
            .map(|(k, s)| (k.clone(), s.count))
            .collect()
    }

    /// Entries ordered by count descending, ties by key
    pub fn sorted_desc(&self) -> Vec<&KeySummary> {
        let mut entries: Vec<&KeySummary> = self.networks.values().collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        entries
    }
}
