//! Insert throughput benchmark.
//!
//! Recreates a collection, then runs a fixed pool of workers draining a
//! bounded queue of insert jobs. Every worker owns its own client handle;
//! handles are never shared between workers.

use crate::client::ApiResponse;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Errors raised by the insert benchmark.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Transport failure or non-2xx status.
    #[error("HTTP error during {op}: {msg}")]
    Http {
        /// Operation in progress.
        op: String,
        /// Underlying error text.
        msg: String,
    },
    /// The service answered with a non-zero code.
    #[error("{op} rejected: {message}")]
    Api {
        /// Operation in progress.
        op: String,
        /// Server message.
        message: String,
    },
    /// A worker stopped on an insert failure.
    #[error("worker {worker} failed: {msg}")]
    Worker {
        /// Worker index.
        worker: usize,
        /// Failure description.
        msg: String,
    },
    /// Rejected before any request was sent.
    #[error("invalid benchmark config: {0}")]
    InvalidConfig(String),
}

/// Collection operations the benchmark needs from the service.
#[async_trait]
pub trait InsertClient: Send + Sync {
    /// Drop `collection`; dropping a missing collection is not an error.
    async fn drop_collection(&self, collection: &str) -> Result<(), BenchError>;
    /// Create `collection` with `dim`-dimensional float vectors and auto ids.
    async fn create_collection(&self, collection: &str, dim: usize) -> Result<(), BenchError>;
    /// Insert one batch of vectors.
    async fn insert(&self, collection: &str, vectors: &[Vec<f32>]) -> Result<(), BenchError>;
}

/// Benchmark parameters.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Collection recreated for the run.
    pub collection: String,
    /// Vector dimension.
    pub dim: usize,
    /// Vectors per insert call.
    pub rows: usize,
    /// Number of workers.
    pub concurrency: usize,
    /// Insert calls queued per worker.
    pub inserts_per_worker: usize,
    /// Capacity of the job queue.
    pub queue_depth: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            collection: String::from("hello_milvus"),
            dim: 1024,
            rows: 1,
            concurrency: 1,
            inserts_per_worker: 100,
            queue_depth: 64,
        }
    }
}

impl BenchConfig {
    /// Reject zero sizes and an empty collection name.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.collection.is_empty() {
            return Err(BenchError::InvalidConfig("collection name is empty".into()));
        }
        for (name, value) in [
            ("dim", self.dim),
            ("rows", self.rows),
            ("concurrency", self.concurrency),
            ("queue_depth", self.queue_depth),
        ] {
            if value == 0 {
                return Err(BenchError::InvalidConfig(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }

    /// Insert calls across all workers.
    pub fn total_inserts(&self) -> u64 {
        self.concurrency as u64 * self.inserts_per_worker as u64
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    /// Wall time of the insert phase.
    pub total_ms: f64,
    /// `dim * 4 * rows` summed over completed inserts.
    pub total_bytes: u64,
    /// Megabytes (2^20) per second.
    pub throughput_mb_s: f64,
    /// Insert calls per second.
    pub qps: f64,
    /// Number of workers.
    pub concurrency: usize,
    /// Completed insert calls.
    pub inserts: u64,
}

impl BenchReport {
    /// Derive throughput figures from `inserts` completed in `elapsed`.
    pub fn compute(config: &BenchConfig, inserts: u64, elapsed: Duration) -> Self {
        let total_ms = elapsed.as_secs_f64() * 1000.0;
        let rows = inserts * config.rows as u64;
        let total_bytes = config.dim as u64 * 4 * rows;
        let secs = elapsed.as_secs_f64();
        let (throughput_mb_s, qps) = if secs > 0.0 {
            (
                total_bytes as f64 / 1024.0 / 1024.0 / secs,
                inserts as f64 / secs,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            total_ms,
            total_bytes,
            throughput_mb_s,
            qps,
            concurrency: config.concurrency,
            inserts,
        }
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total time: {:.2} ms, Total bytes: {}, Throughput: {:.4} MB/s, QPS: {:.4}, concurrency: {}",
            self.total_ms, self.total_bytes, self.throughput_mb_s, self.qps, self.concurrency
        )
    }
}

/// Deterministic vectors: element `k` of row `i` is `(i*dim + k) / (rows*dim)`.
pub fn generate_vectors(rows: usize, dim: usize) -> Vec<Vec<f32>> {
    let denom = (rows * dim) as f32;
    (0..rows)
        .map(|i| (0..dim).map(|k| (i * dim + k) as f32 / denom).collect())
        .collect()
}

/// Run the benchmark. `make_client` is called once for setup and once per worker.
pub async fn run_benchmark<C, F>(config: &BenchConfig, mut make_client: F) -> Result<BenchReport, BenchError>
where
    C: InsertClient + 'static,
    F: FnMut() -> Result<C, BenchError>,
{
    config.validate()?;

    let admin = make_client()?;
    admin.drop_collection(&config.collection).await?;
    admin.create_collection(&config.collection, config.dim).await?;
    drop(admin);
    info!(collection = %config.collection, dim = config.dim, "collection recreated");

    let mut clients = Vec::with_capacity(config.concurrency);
    for _ in 0..config.concurrency {
        clients.push(make_client()?);
    }

    let collection: Arc<str> = Arc::from(config.collection.as_str());
    let vectors = Arc::new(generate_vectors(config.rows, config.dim));
    let (tx, rx) = mpsc::channel::<u64>(config.queue_depth);
    let jobs = Arc::new(Mutex::new(rx));
    let failed = Arc::new(AtomicBool::new(false));

    let start = Instant::now();
    let mut workers = JoinSet::new();
    for (worker, client) in clients.into_iter().enumerate() {
        workers.spawn(run_worker(
            worker,
            client,
            Arc::clone(&collection),
            Arc::clone(&vectors),
            Arc::clone(&jobs),
            Arc::clone(&failed),
        ));
    }

    // Only workers hold the receiver, so sends fail once every worker is gone.
    drop(jobs);

    for job in 0..config.total_inserts() {
        if failed.load(Ordering::SeqCst) || tx.send(job).await.is_err() {
            warn!(job, "stopping job producer early");
            break;
        }
    }
    drop(tx);

    let mut completed = 0u64;
    let mut first_error = None;
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(done)) => completed += done,
            Ok(Err(e)) => {
                first_error.get_or_insert(e);
            }
            Err(e) => {
                first_error.get_or_insert(BenchError::Worker {
                    worker: usize::MAX,
                    msg: e.to_string(),
                });
            }
        }
    }
    let elapsed = start.elapsed();

    if let Some(e) = first_error {
        return Err(e);
    }

    let report = BenchReport::compute(config, completed, elapsed);
    info!(inserts = completed, elapsed_ms = report.total_ms, "benchmark finished");
    Ok(report)
}

async fn run_worker<C: InsertClient>(
    worker: usize,
    client: C,
    collection: Arc<str>,
    vectors: Arc<Vec<Vec<f32>>>,
    jobs: Arc<Mutex<mpsc::Receiver<u64>>>,
    failed: Arc<AtomicBool>,
) -> Result<u64, BenchError> {
    let mut done = 0u64;
    loop {
        let job = jobs.lock().await.recv().await;
        let Some(job) = job else { break };

        if let Err(e) = client.insert(&collection, &vectors).await {
            failed.store(true, Ordering::SeqCst);
            return Err(BenchError::Worker {
                worker,
                msg: format!("insert {} failed: {}", job, e),
            });
        }
        done += 1;
    }
    debug!(worker, done, "worker drained queue");
    Ok(done)
}

/// Client for the service's REST API.
pub struct HttpInsertClient {
    client: Client,
    base: String,
    token: Option<String>,
}

impl HttpInsertClient {
    /// Client for the service at `addr`, with `timeout` on connect and on each request.
    pub fn new(addr: &str, token: Option<String>, timeout: Duration) -> Result<Self, BenchError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| BenchError::Http {
                op: "build client".into(),
                msg: e.to_string(),
            })?;
        Ok(Self {
            client,
            base: addr.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn post(&self, op: &str, path: &str, body: serde_json::Value) -> Result<(), BenchError> {
        let url = format!("{}{}", self.base, path);
        let mut request = self.client.post(&url).json(&body);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| BenchError::Http {
            op: op.to_string(),
            msg: e.to_string(),
        })?;
        if !response.status().is_success() {
            return Err(BenchError::Http {
                op: op.to_string(),
                msg: format!("HTTP {}", response.status()),
            });
        }

        let body: ApiResponse = response.json().await.map_err(|e| BenchError::Http {
            op: op.to_string(),
            msg: e.to_string(),
        })?;
        body.into_result().map_err(|message| BenchError::Api {
            op: op.to_string(),
            message,
        })
    }
}

#[async_trait]
impl InsertClient for HttpInsertClient {
    async fn drop_collection(&self, collection: &str) -> Result<(), BenchError> {
        self.post(
            "drop collection",
            "/v2/vectordb/collections/drop",
            json!({ "collectionName": collection }),
        )
        .await
    }

    async fn create_collection(&self, collection: &str, dim: usize) -> Result<(), BenchError> {
        self.post(
            "create collection",
            "/v2/vectordb/collections/create",
            json!({ "collectionName": collection, "dimension": dim, "autoID": true }),
        )
        .await
    }

    async fn insert(&self, collection: &str, vectors: &[Vec<f32>]) -> Result<(), BenchError> {
        let data: Vec<serde_json::Value> = vectors.iter().map(|v| json!({ "vector": v })).collect();
        self.post(
            "insert",
            "/v2/vectordb/entities/insert",
            json!({ "collectionName": collection, "data": data }),
        )
        .await
    }
}
