//! Settings for the cluster pair and the submission, loaded from a file.

use crate::client::{HttpConnector, DEFAULT_APPLY_PATH};
use crate::error::CtlError;
use crate::submit::{FailurePolicy, SubmitMode, SubmitOptions};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use vrepl_topology::{ClusterDescriptor, SwitchoverController, TopologyError, DEFAULT_PCHANNEL_COUNT};

/// Upper bound of `timeout_secs`.
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Cluster pair and submission settings. Defaults only apply at the CLI boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplSettings {
    /// Id of cluster A, the initial primary.
    pub source_cluster_id: String,
    /// URI of cluster A.
    pub source_addr: String,
    /// Id of cluster B, the initial standby.
    pub target_cluster_id: String,
    /// URI of cluster B.
    pub target_addr: String,
    /// Physical channels generated for each cluster.
    pub pchannel_count: usize,
    /// Credential for both clusters.
    pub token: Option<String>,
    /// Deadline of each connect and apply step.
    pub timeout_secs: u64,
    /// Behaviour on a failed endpoint.
    pub policy: FailurePolicy,
    /// Submit to all endpoints concurrently.
    pub parallel: bool,
    /// Reject edges between clusters with different channel counts.
    pub require_matching_pchannels: bool,
    /// REST path the configuration is posted to.
    pub apply_path: String,
}

impl Default for ReplSettings {
    fn default() -> Self {
        Self {
            source_cluster_id: String::from("by-dev1"),
            source_addr: String::from("http://127.0.0.1:19530"),
            target_cluster_id: String::from("by-dev2"),
            target_addr: String::from("http://127.0.0.1:19531"),
            pchannel_count: DEFAULT_PCHANNEL_COUNT,
            token: None,
            timeout_secs: 10,
            policy: FailurePolicy::BestEffort,
            parallel: false,
            require_matching_pchannels: false,
            apply_path: String::from(DEFAULT_APPLY_PATH),
        }
    }
}

impl ReplSettings {
    /// Load settings from a `.toml` or `.json` file; missing keys take defaults.
    pub fn from_file(path: &Path) -> Result<Self, CtlError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CtlError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext.to_lowercase().as_str() {
            "toml" => toml::from_str(&contents)
                .map_err(|e| CtlError::Config(format!("{}: {}", path.display(), e))),
            "json" => serde_json::from_str(&contents)
                .map_err(|e| CtlError::Config(format!("{}: {}", path.display(), e))),
            _ => Err(CtlError::Config(format!(
                "unsupported config file extension: {}",
                ext
            ))),
        }
    }

    /// Check ranges and addresses before anything touches the network.
    pub fn validate(&self) -> Result<(), CtlError> {
        if self.pchannel_count == 0 {
            return Err(CtlError::Config("pchannel_count must be at least 1".into()));
        }
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(CtlError::Config(format!(
                "timeout_secs must be within 1..={}",
                MAX_TIMEOUT_SECS
            )));
        }
        validate_addr("source_addr", &self.source_addr)?;
        validate_addr("target_addr", &self.target_addr)?;
        if self.source_cluster_id == self.target_cluster_id {
            return Err(CtlError::Config(format!(
                "source and target share cluster id {}",
                self.source_cluster_id
            )));
        }
        Ok(())
    }

    /// `timeout_secs` as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Options for [`ConfigSubmitter`](crate::submit::ConfigSubmitter).
    pub fn submit_options(&self) -> SubmitOptions {
        SubmitOptions {
            policy: self.policy,
            mode: if self.parallel {
                SubmitMode::Parallel
            } else {
                SubmitMode::Sequential
            },
            timeout: self.timeout(),
        }
    }

    /// HTTP connector with this apply path and token.
    pub fn connector(&self) -> HttpConnector {
        HttpConnector::new(self.apply_path.clone(), self.token.clone())
    }

    /// Controller for the source (A) / target (B) pair.
    pub fn controller(&self) -> Result<SwitchoverController, TopologyError> {
        let cluster_a = ClusterDescriptor::builder(self.source_cluster_id.clone())
            .with_uri(self.source_addr.clone())
            .with_optional_token(self.token.clone())
            .with_pchannel_count(self.pchannel_count)
            .build()?;
        let cluster_b = ClusterDescriptor::builder(self.target_cluster_id.clone())
            .with_uri(self.target_addr.clone())
            .with_optional_token(self.token.clone())
            .with_pchannel_count(self.pchannel_count)
            .build()?;

        Ok(SwitchoverController::new(cluster_a, cluster_b)
            .with_matching_pchannels(self.require_matching_pchannels))
    }
}

/// An address must be an absolute `http`/`https` URI with a host.
fn validate_addr(field: &str, addr: &str) -> Result<(), CtlError> {
    let url = Url::parse(addr)
        .map_err(|e| CtlError::Config(format!("{} {:?} is not a valid URI: {}", field, addr, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(CtlError::Config(format!(
            "{} {:?} must look like http://host:port",
            field, addr
        )));
    }
    Ok(())
}
