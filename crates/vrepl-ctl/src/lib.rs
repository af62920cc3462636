#![warn(missing_docs)]

//! vrepl control plane: settings, dual-endpoint configuration submission,
//! the `vrepl`/`vrepl-reset` command surface and the insert benchmark.

pub mod bench;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod submit;

pub use client::{HttpConnector, ReplicateConnector, ReplicateSession};
pub use config::ReplSettings;
pub use error::{CtlError, SubmitError};
pub use submit::{
    ConfigSubmitter, Endpoint, EndpointOutcome, EndpointResult, FailurePolicy, SubmissionReport,
    SubmitMode, SubmitOptions,
};
