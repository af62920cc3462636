//! Primary/standby switchover between two clusters.
//!
//! Two states: `PrimaryA` (edge A→B) and `PrimaryB` (edge B→A). The only
//! trigger is the mode chosen by the operator; there are no automatic
//! transitions. The resulting configuration is re-submitted to every
//! endpoint by the caller.

use crate::cluster::ClusterDescriptor;
use crate::error::TopologyError;
use crate::topology::{ReplicateConfiguration, TopologyEdge};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Mode requested by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationMode {
    /// Initial topology: A replicates to B.
    Init,
    /// Switched topology: B replicates to A.
    Switch,
}

impl ReplicationMode {
    /// The literal accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicationMode::Init => "init",
            ReplicationMode::Switch => "switch",
        }
    }

    /// Operator-facing description of what the mode applies.
    pub fn describe(&self) -> &'static str {
        match self {
            ReplicationMode::Init => "Init replicate configuration: A -> B",
            ReplicationMode::Switch => "Switch primary-standby: B -> A",
        }
    }
}

impl FromStr for ReplicationMode {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(ReplicationMode::Init),
            "switch" => Ok(ReplicationMode::Switch),
            other => Err(TopologyError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for ReplicationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which cluster currently holds the writable role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryState {
    /// Cluster A is primary, B is standby.
    PrimaryA,
    /// Cluster B is primary, A is standby.
    PrimaryB,
}

impl From<ReplicationMode> for PrimaryState {
    fn from(mode: ReplicationMode) -> Self {
        match mode {
            ReplicationMode::Init => PrimaryState::PrimaryA,
            ReplicationMode::Switch => PrimaryState::PrimaryB,
        }
    }
}

/// One of the two clusters managed by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterSide {
    /// First cluster (initial primary).
    A,
    /// Second cluster (initial standby).
    B,
}

impl FromStr for ClusterSide {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(ClusterSide::A),
            "B" | "b" => Ok(ClusterSide::B),
            other => Err(TopologyError::UnknownSide(other.to_string())),
        }
    }
}

/// Maps operator modes to the corresponding configuration of a cluster pair.
#[derive(Debug, Clone)]
pub struct SwitchoverController {
    cluster_a: ClusterDescriptor,
    cluster_b: ClusterDescriptor,
    require_matching_pchannels: bool,
}

impl SwitchoverController {
    /// Create a controller for clusters A and B.
    pub fn new(cluster_a: ClusterDescriptor, cluster_b: ClusterDescriptor) -> Self {
        Self {
            cluster_a,
            cluster_b,
            require_matching_pchannels: false,
        }
    }

    /// Require A and B to carry the same number of channels.
    pub fn with_matching_pchannels(mut self, require: bool) -> Self {
        self.require_matching_pchannels = require;
        self
    }

    /// Descriptor of one side.
    pub fn cluster(&self, side: ClusterSide) -> &ClusterDescriptor {
        match side {
            ClusterSide::A => &self.cluster_a,
            ClusterSide::B => &self.cluster_b,
        }
    }

    /// The edge that realises `state`.
    pub fn edge(&self, state: PrimaryState) -> TopologyEdge {
        let (source, target) = match state {
            PrimaryState::PrimaryA => (&self.cluster_a, &self.cluster_b),
            PrimaryState::PrimaryB => (&self.cluster_b, &self.cluster_a),
        };
        TopologyEdge::new(source.cluster_id(), target.cluster_id())
    }

    /// Full two-cluster configuration for `mode`.
    pub fn configuration(
        &self,
        mode: ReplicationMode,
    ) -> Result<ReplicateConfiguration, TopologyError> {
        let edge = self.edge(mode.into());
        info!(
            mode = %mode,
            source = %edge.source_cluster_id,
            target = %edge.target_cluster_id,
            "{}",
            mode.describe()
        );

        ReplicateConfiguration::builder()
            .require_matching_pchannels(self.require_matching_pchannels)
            .with_cluster(self.cluster_a.clone())
            .with_cluster(self.cluster_b.clone())
            .with_topology(edge.source_cluster_id, edge.target_cluster_id)
            .build()
    }

    /// Single-cluster configuration with no edges, detaching `side` from replication.
    pub fn standalone(&self, side: ClusterSide) -> Result<ReplicateConfiguration, TopologyError> {
        let cluster = self.cluster(side).clone();
        info!(cluster = %cluster.cluster_id(), "building standalone configuration");
        ReplicateConfiguration::builder()
            .with_cluster(cluster)
            .build()
    }
}
