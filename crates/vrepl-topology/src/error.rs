//! Error types for building replicate configurations.

use thiserror::Error;

/// Errors raised while building or validating a replicate configuration.
///
/// All of these are detected locally, before any endpoint is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// A cluster descriptor was built with an empty id.
    #[error("cluster id must not be empty")]
    EmptyClusterId,

    /// The same cluster id was added twice under the reject policy.
    #[error("duplicate cluster: {cluster_id}")]
    DuplicateCluster {
        /// The id that was added more than once.
        cluster_id: String,
    },

    /// A cluster carries no physical channels.
    #[error("cluster {cluster_id} has no physical channels")]
    EmptyPchannels {
        /// The cluster without channels.
        cluster_id: String,
    },

    /// An edge names a cluster that was never added.
    #[error("topology edge {source_id} -> {target_id} references unknown cluster: {unknown}")]
    UnknownCluster {
        /// Source side of the offending edge.
        source_id: String,
        /// Target side of the offending edge.
        target_id: String,
        /// The id that is missing from the cluster set.
        unknown: String,
    },

    /// An edge points a cluster at itself.
    #[error("cluster {cluster_id} cannot replicate to itself")]
    SelfReplication {
        /// The cluster on both ends of the edge.
        cluster_id: String,
    },

    /// The two ends of an edge carry a different number of channels.
    #[error("pchannel count mismatch on {source_id} -> {target_id}: {source_count} vs {target_count}")]
    PchannelCountMismatch {
        /// Source cluster id.
        source_id: String,
        /// Target cluster id.
        target_id: String,
        /// Channels on the source.
        source_count: usize,
        /// Channels on the target.
        target_count: usize,
    },

    /// An operator mode string was not recognised.
    #[error("unknown mode: {0}")]
    UnknownMode(String),

    /// A cluster side string was not recognised.
    #[error("unknown cluster side: {0}")]
    UnknownSide(String),
}
