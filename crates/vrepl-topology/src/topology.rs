//! Replicate configuration document and its builder.
//!
//! A [`ReplicateConfiguration`] is a set of clusters keyed by id plus a set of
//! directed edges. The source of an edge is the writable primary, the target
//! is the standby receiving replicated writes.

use crate::cluster::ClusterDescriptor;
use crate::error::TopologyError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Directed replication edge: `source` replicates to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopologyEdge {
    /// Primary side.
    pub source_cluster_id: String,
    /// Standby side.
    pub target_cluster_id: String,
}

impl TopologyEdge {
    /// Create an edge from `source` to `target`.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_cluster_id: source.into(),
            target_cluster_id: target.into(),
        }
    }

    /// The same edge pointing the other way.
    pub fn reversed(&self) -> Self {
        Self {
            source_cluster_id: self.target_cluster_id.clone(),
            target_cluster_id: self.source_cluster_id.clone(),
        }
    }
}

/// Validated replication configuration, ready to be submitted.
///
/// Only [`ReplicateConfigurationBuilder::build`] produces one, so every
/// edge names a cluster of the same document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicateConfiguration {
    clusters: Vec<ClusterDescriptor>,
    cross_cluster_topology: Vec<TopologyEdge>,
}

impl ReplicateConfiguration {
    /// Start an empty builder.
    pub fn builder() -> ReplicateConfigurationBuilder {
        ReplicateConfigurationBuilder::new()
    }

    /// Clusters in the order they were first added.
    pub fn clusters(&self) -> &[ClusterDescriptor] {
        &self.clusters
    }

    /// Topology edges in the order they were first added.
    pub fn edges(&self) -> &[TopologyEdge] {
        &self.cross_cluster_topology
    }

    /// Look up a cluster by id.
    pub fn cluster(&self, cluster_id: &str) -> Option<&ClusterDescriptor> {
        self.clusters.iter().find(|c| c.cluster_id() == cluster_id)
    }

    /// Ids of all clusters.
    pub fn cluster_ids(&self) -> Vec<&str> {
        self.clusters.iter().map(|c| c.cluster_id()).collect()
    }

    /// True when the document carries no edges (a detached cluster).
    pub fn is_standalone(&self) -> bool {
        self.cross_cluster_topology.is_empty()
    }

    /// Ids of clusters that are the source of at least one edge.
    pub fn primaries(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.cross_cluster_topology
            .iter()
            .map(|e| e.source_cluster_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// What the builder does when the same cluster id is added twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// The later descriptor replaces the earlier one, keeping its position.
    #[default]
    LastWriteWins,
    /// `build()` fails with [`TopologyError::DuplicateCluster`].
    Reject,
}

/// Accumulates clusters and edges; validation happens in [`build`](Self::build).
///
/// The builder is not reset by `build()`: later additions keep accumulating
/// on top of what was already added, and each `build()` returns an
/// independent snapshot.
#[derive(Debug, Clone, Default)]
pub struct ReplicateConfigurationBuilder {
    clusters: Vec<ClusterDescriptor>,
    edges: Vec<TopologyEdge>,
    collision_policy: CollisionPolicy,
    require_matching_pchannels: bool,
}

impl ReplicateConfigurationBuilder {
    /// Create an empty builder with last-write-wins collisions and no parity check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cluster (chained form).
    pub fn with_cluster(mut self, cluster: ClusterDescriptor) -> Self {
        self.add_cluster(cluster);
        self
    }

    /// Add an edge from `source` to `target` (chained form).
    pub fn with_topology(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.add_topology(source, target);
        self
    }

    /// Choose how duplicate cluster ids are handled.
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Require both ends of every edge to carry the same number of channels.
    pub fn require_matching_pchannels(mut self, require: bool) -> Self {
        self.require_matching_pchannels = require;
        self
    }

    /// Add a cluster to an existing builder.
    pub fn add_cluster(&mut self, cluster: ClusterDescriptor) -> &mut Self {
        self.clusters.push(cluster);
        self
    }

    /// Add an edge to an existing builder. Unknown ids are reported by `build()`.
    pub fn add_topology(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> &mut Self {
        self.edges.push(TopologyEdge::new(source, target));
        self
    }

    /// Number of cluster additions so far, duplicates included.
    pub fn pending_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Number of edge additions so far, duplicates included.
    pub fn pending_edges(&self) -> usize {
        self.edges.len()
    }

    /// Validate the accumulated state and return an independent configuration.
    pub fn build(&self) -> Result<ReplicateConfiguration, TopologyError> {
        let clusters = self.resolve_clusters()?;

        for cluster in &clusters {
            if cluster.pchannels().is_empty() {
                return Err(TopologyError::EmptyPchannels {
                    cluster_id: cluster.cluster_id().to_string(),
                });
            }
        }

        let mut edges: Vec<TopologyEdge> = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            if edge.source_cluster_id == edge.target_cluster_id {
                return Err(TopologyError::SelfReplication {
                    cluster_id: edge.source_cluster_id.clone(),
                });
            }

            let unknown = |id: &str| TopologyError::UnknownCluster {
                source_id: edge.source_cluster_id.clone(),
                target_id: edge.target_cluster_id.clone(),
                unknown: id.to_string(),
            };
            let source = find_cluster(&clusters, &edge.source_cluster_id)
                .ok_or_else(|| unknown(edge.source_cluster_id.as_str()))?;
            let target = find_cluster(&clusters, &edge.target_cluster_id)
                .ok_or_else(|| unknown(edge.target_cluster_id.as_str()))?;

            if self.require_matching_pchannels
                && source.pchannel_count() != target.pchannel_count()
            {
                return Err(TopologyError::PchannelCountMismatch {
                    source_id: edge.source_cluster_id.clone(),
                    target_id: edge.target_cluster_id.clone(),
                    source_count: source.pchannel_count(),
                    target_count: target.pchannel_count(),
                });
            }

            if !edges.contains(edge) {
                edges.push(edge.clone());
            }
        }

        debug!(
            clusters = clusters.len(),
            edges = edges.len(),
            "built replicate configuration"
        );

        Ok(ReplicateConfiguration {
            clusters,
            cross_cluster_topology: edges,
        })
    }

    fn resolve_clusters(&self) -> Result<Vec<ClusterDescriptor>, TopologyError> {
        let mut resolved: Vec<ClusterDescriptor> = Vec::with_capacity(self.clusters.len());
        for cluster in &self.clusters {
            match resolved
                .iter()
                .position(|c| c.cluster_id() == cluster.cluster_id())
            {
                Some(_) if self.collision_policy == CollisionPolicy::Reject => {
                    return Err(TopologyError::DuplicateCluster {
                        cluster_id: cluster.cluster_id().to_string(),
                    });
                }
                Some(idx) => resolved[idx] = cluster.clone(),
                None => resolved.push(cluster.clone()),
            }
        }
        Ok(resolved)
    }
}

fn find_cluster<'a>(clusters: &'a [ClusterDescriptor], id: &str) -> Option<&'a ClusterDescriptor> {
    clusters.iter().find(|c| c.cluster_id() == id)
}
