//! Pushes one replicate configuration to several cluster endpoints.
//!
//! Each endpoint gets its own connection: connect, apply, close. Close runs
//! on every exit path. Partial application (A applied, B failed) is a normal
//! outcome and is visible in the [`SubmissionReport`].

use crate::client::ReplicateConnector;
use crate::error::SubmitError;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use vrepl_topology::{ClusterDescriptor, ReplicateConfiguration};

/// What to do when one endpoint fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the run at the first failure.
    FailFast,
    /// Record the failure and continue with the remaining endpoints.
    #[default]
    BestEffort,
}

/// How endpoints are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMode {
    /// One endpoint after the other, in endpoint order.
    #[default]
    Sequential,
    /// One task per endpoint.
    Parallel,
}

/// Policy, scheduling and deadline of one submission.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// Behaviour on the first failed endpoint.
    pub policy: FailurePolicy,
    /// Sequential or parallel scheduling.
    pub mode: SubmitMode,
    /// Deadline for the connect step and, separately, for the apply step.
    pub timeout: Duration,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::BestEffort,
            mode: SubmitMode::Sequential,
            timeout: Duration::from_secs(10),
        }
    }
}

/// A cluster endpoint the configuration is pushed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// Name used in reports, normally the cluster id.
    pub name: String,
    /// Base URI, e.g. `http://127.0.0.1:19530`.
    pub address: String,
}

impl Endpoint {
    /// Endpoint named `name` at `address`.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Endpoint of one cluster descriptor.
    pub fn from_cluster(cluster: &ClusterDescriptor) -> Self {
        Self::new(cluster.cluster_id(), cluster.uri())
    }

    /// One endpoint per cluster of `config`, in cluster order.
    pub fn all_from(config: &ReplicateConfiguration) -> Vec<Self> {
        config.clusters().iter().map(Self::from_cluster).collect()
    }
}

/// Result of pushing the configuration to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointOutcome {
    /// The endpoint accepted the configuration.
    Applied,
    /// Connect or apply failed.
    Failed(SubmitError),
}

/// One row of a [`SubmissionReport`].
#[derive(Debug, Clone)]
pub struct EndpointResult {
    /// Target endpoint.
    pub endpoint: Endpoint,
    /// What happened.
    pub outcome: EndpointOutcome,
    /// Connect, apply and close, in milliseconds.
    pub latency_ms: u64,
}

impl EndpointResult {
    /// True when the endpoint applied the configuration.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, EndpointOutcome::Applied)
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&SubmitError> {
        match &self.outcome {
            EndpointOutcome::Applied => None,
            EndpointOutcome::Failed(e) => Some(e),
        }
    }
}

/// Per-endpoint outcome of one submission, in endpoint order.
#[derive(Debug, Clone, Default)]
pub struct SubmissionReport {
    /// One entry per endpoint.
    pub results: Vec<EndpointResult>,
    /// A shutdown was requested while endpoints were still in flight.
    pub interrupted: bool,
}

impl SubmissionReport {
    /// True when there was at least one endpoint and all of them applied.
    pub fn all_succeeded(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.is_success())
    }

    /// True when at least one endpoint failed.
    pub fn any_failed(&self) -> bool {
        self.results.iter().any(|r| !r.is_success())
    }

    /// True when some endpoints applied the configuration and others did not.
    pub fn is_partial(&self) -> bool {
        self.any_failed() && self.results.iter().any(|r| r.is_success())
    }

    /// Names of endpoints that applied the configuration.
    pub fn successful_endpoints(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.endpoint.name.as_str())
            .collect()
    }

    /// Names of endpoints that failed.
    pub fn failed_endpoints(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.endpoint.name.as_str())
            .collect()
    }

    /// Outcome for the endpoint called `name`.
    pub fn outcome(&self, name: &str) -> Option<&EndpointOutcome> {
        self.results
            .iter()
            .find(|r| r.endpoint.name == name)
            .map(|r| &r.outcome)
    }

    /// First failure in endpoint order.
    pub fn first_error(&self) -> Option<&SubmitError> {
        self.results.iter().find_map(|r| r.error())
    }

    /// Operator-facing table.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{:<20} {:<32} {:<8} {:>10}\n",
            "ENDPOINT", "ADDRESS", "STATUS", "LATENCY"
        );
        out.push_str(&"-".repeat(73));
        out.push('\n');
        for r in &self.results {
            let status = if r.is_success() { "ok" } else { "failed" };
            out.push_str(&format!(
                "{:<20} {:<32} {:<8} {:>8}ms\n",
                r.endpoint.name, r.endpoint.address, status, r.latency_ms
            ));
            if let Some(err) = r.error() {
                out.push_str(&format!("  {}\n", err));
            }
        }
        if self.interrupted {
            out.push_str("shutdown requested: in-flight submissions were allowed to finish\n");
        }
        out
    }
}

/// Submits configurations through a [`ReplicateConnector`].
pub struct ConfigSubmitter<C> {
    connector: Arc<C>,
    options: SubmitOptions,
}

impl<C> ConfigSubmitter<C>
where
    C: ReplicateConnector + 'static,
{
    /// Submitter using `connector` for every endpoint.
    pub fn new(connector: C, options: SubmitOptions) -> Self {
        Self {
            connector: Arc::new(connector),
            options,
        }
    }

    /// Options this submitter was created with.
    pub fn options(&self) -> &SubmitOptions {
        &self.options
    }

    /// Push `config` to every endpoint.
    ///
    /// Under [`FailurePolicy::FailFast`] the first failure (in endpoint order)
    /// is returned as an error. In parallel mode the other tasks still run to
    /// completion or to their deadline first.
    pub async fn submit(
        &self,
        config: &ReplicateConfiguration,
        endpoints: &[Endpoint],
    ) -> Result<SubmissionReport, SubmitError> {
        info!(
            endpoints = endpoints.len(),
            policy = ?self.options.policy,
            mode = ?self.options.mode,
            "submitting replicate configuration"
        );

        let report = match self.options.mode {
            SubmitMode::Sequential => self.submit_sequential(config, endpoints).await?,
            SubmitMode::Parallel => self.submit_parallel(config, endpoints).await,
        };

        if self.options.policy == FailurePolicy::FailFast {
            if let Some(err) = report.first_error() {
                return Err(err.clone());
            }
        }
        if report.is_partial() {
            warn!(
                failed = ?report.failed_endpoints(),
                "replicate configuration partially applied"
            );
        }
        Ok(report)
    }

    /// Like [`submit`](Self::submit), but observes a shutdown signal.
    ///
    /// When `shutdown` resolves, in-flight submissions are not cancelled:
    /// they keep running until they finish or hit their own deadline, so no
    /// endpoint is left mid-apply. The report is marked
    /// [`interrupted`](SubmissionReport::interrupted).
    pub async fn submit_until_shutdown<F>(
        &self,
        config: &ReplicateConfiguration,
        endpoints: &[Endpoint],
        shutdown: F,
    ) -> Result<SubmissionReport, SubmitError>
    where
        F: Future<Output = ()>,
    {
        let submission = self.submit(config, endpoints);
        tokio::pin!(submission);
        tokio::pin!(shutdown);

        tokio::select! {
            result = &mut submission => return result,
            _ = &mut shutdown => {
                warn!(
                    timeout_secs = self.options.timeout.as_secs(),
                    "shutdown requested, waiting for in-flight submissions to finish"
                );
            }
        }

        let mut report = submission.await?;
        report.interrupted = true;
        Ok(report)
    }

    async fn submit_sequential(
        &self,
        config: &ReplicateConfiguration,
        endpoints: &[Endpoint],
    ) -> Result<SubmissionReport, SubmitError> {
        let mut report = SubmissionReport::default();
        for endpoint in endpoints {
            let result =
                submit_one(self.connector.as_ref(), config, endpoint, self.options.timeout).await;
            if self.options.policy == FailurePolicy::FailFast {
                if let Some(err) = result.error() {
                    return Err(err.clone());
                }
            }
            report.results.push(result);
        }
        Ok(report)
    }

    async fn submit_parallel(
        &self,
        config: &ReplicateConfiguration,
        endpoints: &[Endpoint],
    ) -> SubmissionReport {
        let config = Arc::new(config.clone());
        let timeout = self.options.timeout;

        let (targets, handles): (Vec<_>, Vec<_>) = endpoints
            .iter()
            .cloned()
            .map(|endpoint| {
                let connector = Arc::clone(&self.connector);
                let config = Arc::clone(&config);
                let target = endpoint.clone();
                let handle = tokio::spawn(async move {
                    submit_one(connector.as_ref(), &config, &endpoint, timeout).await
                });
                (target, handle)
            })
            .unzip();

        let mut report = SubmissionReport::default();
        for (endpoint, joined) in targets.into_iter().zip(join_all(handles).await) {
            let result = match joined {
                Ok(result) => result,
                Err(e) => EndpointResult {
                    outcome: EndpointOutcome::Failed(SubmitError::Connection {
                        endpoint: endpoint.name.clone(),
                        reason: format!("submission task failed: {}", e),
                    }),
                    endpoint,
                    latency_ms: 0,
                },
            };
            report.results.push(result);
        }
        report
    }
}

async fn submit_one<C>(
    connector: &C,
    config: &ReplicateConfiguration,
    endpoint: &Endpoint,
    timeout: Duration,
) -> EndpointResult
where
    C: ReplicateConnector + ?Sized,
{
    let start = Instant::now();
    let outcome = match connect_and_apply(connector, config, endpoint, timeout).await {
        Ok(()) => {
            info!(endpoint = %endpoint.name, addr = %endpoint.address, "replicate configuration updated");
            EndpointOutcome::Applied
        }
        Err(e) => {
            error!(endpoint = %endpoint.name, addr = %endpoint.address, "failed to update replicate configuration: {}", e);
            EndpointOutcome::Failed(e)
        }
    };

    EndpointResult {
        endpoint: endpoint.clone(),
        outcome,
        latency_ms: start.elapsed().as_millis() as u64,
    }
}

async fn connect_and_apply<C>(
    connector: &C,
    config: &ReplicateConfiguration,
    endpoint: &Endpoint,
    timeout: Duration,
) -> Result<(), SubmitError>
where
    C: ReplicateConnector + ?Sized,
{
    let mut session = match tokio::time::timeout(timeout, connector.connect(endpoint, timeout)).await
    {
        Ok(session) => session?,
        Err(_) => {
            return Err(SubmitError::Connection {
                endpoint: endpoint.name.clone(),
                reason: format!("connect timed out after {}s", timeout.as_secs()),
            })
        }
    };

    let applied = match tokio::time::timeout(timeout, session.apply(config)).await {
        Ok(result) => result,
        Err(_) => Err(SubmitError::Connection {
            endpoint: endpoint.name.clone(),
            reason: format!("apply timed out after {}s", timeout.as_secs()),
        }),
    };

    session.close().await;
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ReplicateSession;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[derive(Debug, Clone, Copy)]
    enum Behavior {
        Ok,
        Unreachable,
        Reject,
        HangOnApply,
        HangOnConnect,
        /// Fires the shutdown signal, then takes a while to apply.
        SignalThenApply,
    }

    #[derive(Default)]
    struct Counters {
        connects: AtomicUsize,
        applies: AtomicUsize,
        closes: AtomicUsize,
        applied_to: Mutex<Vec<String>>,
        shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    }

    struct FakeConnector {
        behaviors: HashMap<String, Behavior>,
        counters: Arc<Counters>,
    }

    impl FakeConnector {
        fn new(behaviors: &[(&str, Behavior)]) -> (Self, Arc<Counters>) {
            let counters = Arc::new(Counters::default());
            let connector = Self {
                behaviors: behaviors
                    .iter()
                    .map(|(name, b)| (name.to_string(), *b))
                    .collect(),
                counters: Arc::clone(&counters),
            };
            (connector, counters)
        }
    }

    struct FakeSession {
        endpoint: String,
        behavior: Behavior,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl ReplicateConnector for FakeConnector {
        async fn connect(
            &self,
            endpoint: &Endpoint,
            _timeout: Duration,
        ) -> Result<Box<dyn ReplicateSession>, SubmitError> {
            self.counters.connects.fetch_add(1, Ordering::SeqCst);
            let behavior = self.behaviors.get(&endpoint.name).copied().unwrap_or(Behavior::Ok);
            match behavior {
                Behavior::Unreachable => Err(SubmitError::Connection {
                    endpoint: endpoint.name.clone(),
                    reason: "connection refused".to_string(),
                }),
                Behavior::HangOnConnect => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!()
                }
                _ => Ok(Box::new(FakeSession {
                    endpoint: endpoint.name.clone(),
                    behavior,
                    counters: Arc::clone(&self.counters),
                })),
            }
        }
    }

    #[async_trait]
    impl ReplicateSession for FakeSession {
        async fn apply(&mut self, _config: &ReplicateConfiguration) -> Result<(), SubmitError> {
            self.counters.applies.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Reject => Err(SubmitError::Apply {
                    endpoint: self.endpoint.clone(),
                    message: "invalid topology".to_string(),
                }),
                Behavior::HangOnApply => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(())
                }
                Behavior::SignalThenApply => {
                    let signal = self.counters.shutdown_tx.lock().unwrap().take();
                    if let Some(tx) = signal {
                        let _ = tx.send(());
                    }
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    self.counters
                        .applied_to
                        .lock()
                        .unwrap()
                        .push(self.endpoint.clone());
                    Ok(())
                }
                _ => {
                    self.counters
                        .applied_to
                        .lock()
                        .unwrap()
                        .push(self.endpoint.clone());
                    Ok(())
                }
            }
        }

        async fn close(self: Box<Self>) {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn scenario_config() -> ReplicateConfiguration {
        let a = ClusterDescriptor::builder("cluster-a")
            .with_uri("http://127.0.0.1:19530")
            .with_pchannel_count(16)
            .build()
            .unwrap();
        let b = ClusterDescriptor::builder("cluster-b")
            .with_uri("http://127.0.0.1:19531")
            .with_pchannel_count(16)
            .build()
            .unwrap();
        ReplicateConfiguration::builder()
            .with_cluster(a)
            .with_cluster(b)
            .with_topology("cluster-a", "cluster-b")
            .build()
            .unwrap()
    }

    fn options(policy: FailurePolicy, mode: SubmitMode) -> SubmitOptions {
        SubmitOptions {
            policy,
            mode,
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn test_endpoints_follow_cluster_order() {
        let endpoints = Endpoint::all_from(&scenario_config());
        assert_eq!(
            endpoints,
            vec![
                Endpoint::new("cluster-a", "http://127.0.0.1:19530"),
                Endpoint::new("cluster-b", "http://127.0.0.1:19531"),
            ]
        );
    }

    #[tokio::test]
    async fn test_best_effort_unreachable_target() {
        let config = scenario_config();
        let (connector, counters) = FakeConnector::new(&[("cluster-b", Behavior::Unreachable)]);
        let submitter = ConfigSubmitter::new(
            connector,
            options(FailurePolicy::BestEffort, SubmitMode::Sequential),
        );

        let report = submitter
            .submit(&config, &Endpoint::all_from(&config))
            .await
            .unwrap();

        assert_eq!(report.outcome("cluster-a"), Some(&EndpointOutcome::Applied));
        assert!(matches!(
            report.outcome("cluster-b"),
            Some(EndpointOutcome::Failed(SubmitError::Connection { .. }))
        ));
        assert!(report.is_partial());
        assert_eq!(report.successful_endpoints(), vec!["cluster-a"]);
        assert_eq!(report.failed_endpoints(), vec!["cluster-b"]);
        assert_eq!(
            *counters.applied_to.lock().unwrap(),
            vec!["cluster-a".to_string()]
        );
    }

    #[tokio::test]
    async fn test_best_effort_continues_after_first_failure() {
        let config = scenario_config();
        let (connector, counters) = FakeConnector::new(&[("cluster-a", Behavior::Unreachable)]);
        let submitter = ConfigSubmitter::new(
            connector,
            options(FailurePolicy::BestEffort, SubmitMode::Sequential),
        );

        let report = submitter
            .submit(&config, &Endpoint::all_from(&config))
            .await
            .unwrap();

        assert_eq!(report.failed_endpoints(), vec!["cluster-a"]);
        assert_eq!(counters.connects.load(Ordering::SeqCst), 2);
        assert_eq!(
            *counters.applied_to.lock().unwrap(),
            vec!["cluster-b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_fail_fast_stops_sequential_run() {
        let config = scenario_config();
        let (connector, counters) = FakeConnector::new(&[("cluster-a", Behavior::Unreachable)]);
        let submitter = ConfigSubmitter::new(
            connector,
            options(FailurePolicy::FailFast, SubmitMode::Sequential),
        );

        let err = submitter
            .submit(&config, &Endpoint::all_from(&config))
            .await
            .unwrap_err();

        assert_eq!(err.endpoint(), "cluster-a");
        assert_eq!(counters.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fail_fast_parallel_returns_first_error() {
        let config = scenario_config();
        let (connector, counters) = FakeConnector::new(&[("cluster-b", Behavior::Reject)]);
        let submitter = ConfigSubmitter::new(
            connector,
            options(FailurePolicy::FailFast, SubmitMode::Parallel),
        );

        let err = submitter
            .submit(&config, &Endpoint::all_from(&config))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Apply { ref endpoint, .. } if endpoint == "cluster-b"));
        assert_eq!(counters.closes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_parallel_best_effort_reports_in_endpoint_order() {
        let config = scenario_config();
        let (connector, _counters) = FakeConnector::new(&[("cluster-a", Behavior::Reject)]);
        let submitter = ConfigSubmitter::new(
            connector,
            options(FailurePolicy::BestEffort, SubmitMode::Parallel),
        );

        let report = submitter
            .submit(&config, &Endpoint::all_from(&config))
            .await
            .unwrap();

        let names: Vec<&str> = report.results.iter().map(|r| r.endpoint.name.as_str()).collect();
        assert_eq!(names, vec!["cluster-a", "cluster-b"]);
        assert_eq!(report.failed_endpoints(), vec!["cluster-a"]);
    }

    #[tokio::test]
    async fn test_session_closed_on_success_and_rejection() {
        let config = scenario_config();
        let (connector, counters) = FakeConnector::new(&[("cluster-b", Behavior::Reject)]);
        let submitter = ConfigSubmitter::new(
            connector,
            options(FailurePolicy::BestEffort, SubmitMode::Sequential),
        );

        submitter
            .submit(&config, &Endpoint::all_from(&config))
            .await
            .unwrap();

        assert_eq!(counters.connects.load(Ordering::SeqCst), 2);
        assert_eq!(counters.applies.load(Ordering::SeqCst), 2);
        assert_eq!(counters.closes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_timeout_closes_session() {
        let config = scenario_config();
        let (connector, counters) = FakeConnector::new(&[("cluster-a", Behavior::HangOnApply)]);
        let submitter = ConfigSubmitter::new(
            connector,
            options(FailurePolicy::BestEffort, SubmitMode::Sequential),
        );

        let report = submitter
            .submit(&config, &Endpoint::all_from(&config))
            .await
            .unwrap();

        let err = report.first_error().unwrap();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("apply timed out"));
        assert_eq!(counters.closes.load(Ordering::SeqCst), 2);
        assert_eq!(report.successful_endpoints(), vec!["cluster-b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timeout_is_connection_error() {
        let config = scenario_config();
        let (connector, counters) = FakeConnector::new(&[("cluster-b", Behavior::HangOnConnect)]);
        let submitter = ConfigSubmitter::new(
            connector,
            options(FailurePolicy::BestEffort, SubmitMode::Parallel),
        );

        let report = submitter
            .submit(&config, &Endpoint::all_from(&config))
            .await
            .unwrap();

        assert!(matches!(
            report.outcome("cluster-b"),
            Some(EndpointOutcome::Failed(SubmitError::Connection { reason, .. })) if reason.contains("connect timed out")
        ));
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_does_not_cancel_inflight_apply() {
        let config = scenario_config();
        let (connector, counters) =
            FakeConnector::new(&[("cluster-a", Behavior::SignalThenApply)]);
        let (tx, rx) = oneshot::channel();
        *counters.shutdown_tx.lock().unwrap() = Some(tx);
        let submitter = ConfigSubmitter::new(
            connector,
            options(FailurePolicy::BestEffort, SubmitMode::Sequential),
        );

        let shutdown = async {
            let _ = rx.await;
        };
        let report = submitter
            .submit_until_shutdown(&config, &Endpoint::all_from(&config), shutdown)
            .await
            .unwrap();

        // The signal fired during cluster-a's apply, which still completed.
        assert!(report.interrupted);
        assert!(report.all_succeeded());
        assert_eq!(
            *counters.applied_to.lock().unwrap(),
            vec!["cluster-a".to_string(), "cluster-b".to_string()]
        );
        assert_eq!(counters.closes.load(Ordering::SeqCst), 2);
        assert!(report.render().contains("shutdown requested"));
    }

    #[tokio::test]
    async fn test_submission_finishing_first_is_not_interrupted() {
        let config = scenario_config();
        let (connector, _counters) = FakeConnector::new(&[]);
        let submitter = ConfigSubmitter::new(connector, SubmitOptions::default());

        let report = submitter
            .submit_until_shutdown(&config, &Endpoint::all_from(&config), std::future::pending())
            .await
            .unwrap();

        assert!(!report.interrupted);
        assert!(report.all_succeeded());
    }

    #[tokio::test]
    async fn test_empty_endpoint_list() {
        let config = scenario_config();
        let (connector, counters) = FakeConnector::new(&[]);
        let submitter = ConfigSubmitter::new(connector, SubmitOptions::default());

        let report = submitter.submit(&config, &[]).await.unwrap();
        assert!(report.results.is_empty());
        assert!(!report.all_succeeded());
        assert_eq!(counters.connects.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_render_lists_failures() {
        let report = SubmissionReport {
            results: vec![
                EndpointResult {
                    endpoint: Endpoint::new("cluster-a", "http://127.0.0.1:19530"),
                    outcome: EndpointOutcome::Applied,
                    latency_ms: 12,
                },
                EndpointResult {
                    endpoint: Endpoint::new("cluster-b", "http://127.0.0.1:19531"),
                    outcome: EndpointOutcome::Failed(SubmitError::Connection {
                        endpoint: "cluster-b".to_string(),
                        reason: "connection refused".to_string(),
                    }),
                    latency_ms: 3,
                },
            ],
            ..SubmissionReport::default()
        };
        let table = report.render();
        assert!(table.contains("cluster-a"));
        assert!(table.contains("failed"));
        assert!(table.contains("cannot reach cluster-b: connection refused"));
    }
}
