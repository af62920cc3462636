//! Cluster descriptors: one member of a replication topology.

use crate::channel::pchannel_names;
use crate::error::TopologyError;
use serde::{Deserialize, Serialize};

/// How peers reach a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParam {
    /// Endpoint URI (e.g. `http://127.0.0.1:19530`).
    pub uri: String,
    /// Credential presented to the cluster, if it requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Identity, address and physical channels of one cluster.
///
/// Descriptors are immutable once built; use [`ClusterDescriptorBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterDescriptor {
    cluster_id: String,
    connection_param: ConnectionParam,
    pchannels: Vec<String>,
}

impl ClusterDescriptor {
    /// Start building a descriptor for `cluster_id`.
    pub fn builder(cluster_id: impl Into<String>) -> ClusterDescriptorBuilder {
        ClusterDescriptorBuilder::new(cluster_id)
    }

    /// Cluster id, unique within a configuration.
    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    /// Endpoint URI.
    pub fn uri(&self) -> &str {
        &self.connection_param.uri
    }

    /// Credential, if any.
    pub fn token(&self) -> Option<&str> {
        self.connection_param.token.as_deref()
    }

    /// Connection parameters as serialized.
    pub fn connection_param(&self) -> &ConnectionParam {
        &self.connection_param
    }

    /// Physical channels in order.
    pub fn pchannels(&self) -> &[String] {
        &self.pchannels
    }

    /// Number of physical channels.
    pub fn pchannel_count(&self) -> usize {
        self.pchannels.len()
    }
}

/// Chained builder for [`ClusterDescriptor`].
#[derive(Debug, Clone, Default)]
pub struct ClusterDescriptorBuilder {
    cluster_id: String,
    uri: String,
    token: Option<String>,
    pchannels: Vec<String>,
}

impl ClusterDescriptorBuilder {
    /// Create a builder for `cluster_id`.
    pub fn new(cluster_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            ..Default::default()
        }
    }

    /// Set the endpoint URI. Reachability is checked at submission time.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Set the credential presented to this cluster.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set an optional credential.
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Set an explicit channel list, replacing any previous one.
    pub fn with_pchannels<I, S>(mut self, pchannels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pchannels = pchannels.into_iter().map(Into::into).collect();
        self
    }

    /// Generate `count` conventionally named channels for this cluster.
    pub fn with_pchannel_count(mut self, count: usize) -> Self {
        self.pchannels = pchannel_names(&self.cluster_id, count);
        self
    }

    /// Finish the descriptor. Only an empty cluster id is rejected here.
    pub fn build(self) -> Result<ClusterDescriptor, TopologyError> {
        if self.cluster_id.is_empty() {
            return Err(TopologyError::EmptyClusterId);
        }
        Ok(ClusterDescriptor {
            cluster_id: self.cluster_id,
            connection_param: ConnectionParam {
                uri: self.uri,
                token: self.token,
            },
            pchannels: self.pchannels,
        })
    }
}
