//! Command surface of `vrepl` and `vrepl-reset`.
//!
//! Binaries stay thin: they parse arguments, call [`run`] or [`run_reset`]
//! with the HTTP connector, and map the outcome to an exit status.

use crate::client::ReplicateConnector;
use crate::config::ReplSettings;
use crate::error::CtlError;
use crate::submit::{ConfigSubmitter, Endpoint, FailurePolicy, SubmissionReport};
use clap::{Args, Parser};
use std::future::Future;
use std::path::PathBuf;
use tracing::{debug, info};
use vrepl_topology::{ClusterSide, ReplicateConfiguration, ReplicationMode};

/// Two-line usage of `vrepl`.
pub const USAGE: &str = "usage: vrepl init    apply replicate configuration A -> B
       vrepl switch  switch primary-standby to B -> A";

/// Two-line usage of `vrepl-reset`.
pub const RESET_USAGE: &str = "usage: vrepl-reset A  detach cluster A (empty topology)
       vrepl-reset B  detach cluster B (empty topology)";

/// Settings overrides shared by the submission commands.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// TOML or JSON settings file.
    #[arg(long, env = "VREPL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Id of cluster A.
    #[arg(long, env = "SOURCE_CLUSTER_ID")]
    pub source_cluster_id: Option<String>,

    /// URI of cluster A.
    #[arg(long, env = "SOURCE_ADDR")]
    pub source_addr: Option<String>,

    /// Id of cluster B.
    #[arg(long, env = "TARGET_CLUSTER_ID")]
    pub target_cluster_id: Option<String>,

    /// URI of cluster B.
    #[arg(long, env = "TARGET_ADDR")]
    pub target_addr: Option<String>,

    /// Physical channels per cluster.
    #[arg(long, env = "PCHANNEL_COUNT")]
    pub pchannel_count: Option<usize>,

    /// Credential for both clusters.
    #[arg(long, env = "VREPL_TOKEN")]
    pub token: Option<String>,

    /// Deadline of each connect and apply step.
    #[arg(long, env = "VREPL_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// `fail-fast` or `best-effort`.
    #[arg(long, env = "VREPL_POLICY", value_enum)]
    pub policy: Option<FailurePolicy>,

    /// Submit to all endpoints concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Reject topologies whose clusters carry different channel counts.
    #[arg(long)]
    pub require_matching_pchannels: bool,
}

impl SettingsArgs {
    /// Defaults, then the settings file, then flags and environment.
    pub fn resolve(&self) -> Result<ReplSettings, CtlError> {
        let mut settings = match &self.config {
            Some(path) => ReplSettings::from_file(path)?,
            None => ReplSettings::default(),
        };

        if let Some(ref v) = self.source_cluster_id {
            settings.source_cluster_id = v.clone();
        }
        if let Some(ref v) = self.source_addr {
            settings.source_addr = v.clone();
        }
        if let Some(ref v) = self.target_cluster_id {
            settings.target_cluster_id = v.clone();
        }
        if let Some(ref v) = self.target_addr {
            settings.target_addr = v.clone();
        }
        if let Some(v) = self.pchannel_count {
            settings.pchannel_count = v;
        }
        if let Some(ref v) = self.token {
            settings.token = Some(v.clone());
        }
        if let Some(v) = self.timeout_secs {
            settings.timeout_secs = v;
        }
        if let Some(v) = self.policy {
            settings.policy = v;
        }
        if self.parallel {
            settings.parallel = true;
        }
        if self.require_matching_pchannels {
            settings.require_matching_pchannels = true;
        }

        settings.validate()?;
        Ok(settings)
    }
}

/// Arguments of `vrepl`.
#[derive(Parser, Debug)]
#[command(name = "vrepl")]
#[command(about = "Apply cross-cluster replicate configuration", long_about = None)]
pub struct Cli {
    /// `init` (A -> B) or `switch` (B -> A).
    pub mode: Option<String>,

    /// Settings overrides.
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Print the configuration document instead of submitting it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments of `vrepl-reset`.
#[derive(Parser, Debug)]
#[command(name = "vrepl-reset")]
#[command(about = "Detach one cluster from replication", long_about = None)]
pub struct ResetCli {
    /// `A` or `B`.
    pub side: Option<String>,

    /// Settings overrides.
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Print the configuration document instead of submitting it.
    #[arg(long)]
    pub dry_run: bool,
}

/// What a successful command run produced.
#[derive(Debug)]
pub enum RunOutcome {
    /// Pretty-printed configuration document.
    DryRun(String),
    /// Per-endpoint results of a submission.
    Submitted(SubmissionReport),
}

impl RunOutcome {
    /// 0 when nothing failed, 1 when any endpoint failed.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Submitted(report) if report.any_failed() => 1,
            _ => 0,
        }
    }
}

/// Parse the `vrepl` mode argument.
pub fn parse_mode(mode: Option<&str>) -> Result<ReplicationMode, CtlError> {
    let mode = mode.ok_or_else(|| CtlError::Usage("missing mode".to_string()))?;
    mode.parse()
        .map_err(|_| CtlError::Usage(format!("unknown mode: {}", mode)))
}

/// Parse the `vrepl-reset` side argument.
pub fn parse_side(side: Option<&str>) -> Result<ClusterSide, CtlError> {
    let side = side.ok_or_else(|| CtlError::Usage("missing cluster side".to_string()))?;
    side.parse()
        .map_err(|_| CtlError::Usage(format!("unknown cluster side: {}", side)))
}

/// Text for stderr when a command fails.
///
/// Usage errors print the two usage lines and nothing else; the offending
/// argument only goes to the debug log.
pub fn error_message(err: &CtlError, usage: &str) -> String {
    match err {
        CtlError::Usage(reason) => {
            debug!(%reason, "usage error");
            usage.to_string()
        }
        other => format!("error: {}", other),
    }
}

/// Resolves once the process receives Ctrl-C.
pub async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// `vrepl`: build the init/switch configuration and submit it to both clusters.
///
/// The mode is checked before settings are read, so a bad invocation never
/// reaches the network.
pub async fn run<C, F, S>(cli: &Cli, make_connector: F, shutdown: S) -> Result<RunOutcome, CtlError>
where
    C: ReplicateConnector + 'static,
    F: FnOnce(&ReplSettings) -> C,
    S: Future<Output = ()>,
{
    let mode = parse_mode(cli.mode.as_deref())?;
    let settings = cli.settings.resolve()?;

    let config = settings.controller()?.configuration(mode)?;
    let endpoints = Endpoint::all_from(&config);

    finish(&config, &endpoints, &settings, cli.dry_run, make_connector, shutdown).await
}

/// `vrepl-reset`: apply a standalone configuration to one cluster only.
pub async fn run_reset<C, F, S>(
    cli: &ResetCli,
    make_connector: F,
    shutdown: S,
) -> Result<RunOutcome, CtlError>
where
    C: ReplicateConnector + 'static,
    F: FnOnce(&ReplSettings) -> C,
    S: Future<Output = ()>,
{
    let side = parse_side(cli.side.as_deref())?;
    let settings = cli.settings.resolve()?;

    let config = settings.controller()?.standalone(side)?;
    let endpoints = Endpoint::all_from(&config);

    finish(&config, &endpoints, &settings, cli.dry_run, make_connector, shutdown).await
}

async fn finish<C, F, S>(
    config: &ReplicateConfiguration,
    endpoints: &[Endpoint],
    settings: &ReplSettings,
    dry_run: bool,
    make_connector: F,
    shutdown: S,
) -> Result<RunOutcome, CtlError>
where
    C: ReplicateConnector + 'static,
    F: FnOnce(&ReplSettings) -> C,
    S: Future<Output = ()>,
{
    if dry_run {
        return Ok(RunOutcome::DryRun(config.to_json_pretty()?));
    }

    let submitter = ConfigSubmitter::new(make_connector(settings), settings.submit_options());
    let report = submitter
        .submit_until_shutdown(config, endpoints, shutdown)
        .await?;
    info!(
        applied = report.successful_endpoints().len(),
        failed = report.failed_endpoints().len(),
        "submission finished"
    );
    Ok(RunOutcome::Submitted(report))
}
