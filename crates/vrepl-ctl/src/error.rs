//! Error types for submission and the command-line tools.

use thiserror::Error;
use vrepl_topology::TopologyError;

/// Failure to push a configuration to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Endpoint unreachable, or it did not answer before the deadline.
    #[error("cannot reach {endpoint}: {reason}")]
    Connection {
        /// Endpoint name.
        endpoint: String,
        /// Why the endpoint could not be reached.
        reason: String,
    },
    /// Endpoint answered and rejected the configuration.
    #[error("{endpoint} rejected replicate configuration: {message}")]
    Apply {
        /// Endpoint name.
        endpoint: String,
        /// Server-side error message.
        message: String,
    },
}

impl SubmitError {
    /// Name of the endpoint that failed.
    pub fn endpoint(&self) -> &str {
        match self {
            SubmitError::Connection { endpoint, .. } | SubmitError::Apply { endpoint, .. } => {
                endpoint
            }
        }
    }

    /// Connection failures may clear up on their own; rejections will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::Connection { .. })
    }
}

/// Top-level error of the `vrepl` and `vrepl-reset` commands.
#[derive(Debug, Error)]
pub enum CtlError {
    /// Missing or unknown mode or cluster side.
    #[error("usage error: {0}")]
    Usage(String),
    /// The configuration failed validation before any network call.
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),
    /// Submission aborted under fail-fast.
    #[error(transparent)]
    Submit(#[from] SubmitError),
    /// Unreadable settings file or out-of-range setting.
    #[error("configuration error: {0}")]
    Config(String),
    /// The document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CtlError {
    /// Process exit status for this error: 2 for misuse, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CtlError::Usage(_) => 2,
            _ => 1,
        }
    }
}
