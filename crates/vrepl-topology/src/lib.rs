#![warn(missing_docs)]

//! vrepl topology: cluster descriptors, replicate configuration builder and switchover controller.

pub mod channel;
pub mod cluster;
pub mod error;
pub mod switchover;
pub mod topology;

pub use channel::{pchannel_name, pchannel_names, DEFAULT_PCHANNEL_COUNT};
pub use cluster::{ClusterDescriptor, ClusterDescriptorBuilder, ConnectionParam};
pub use error::TopologyError;
pub use switchover::{ClusterSide, PrimaryState, ReplicationMode, SwitchoverController};
pub use topology::{
    CollisionPolicy, ReplicateConfiguration, ReplicateConfigurationBuilder, TopologyEdge,
};
