use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use vrepl_ctl::bench::{run_benchmark, BenchConfig, HttpInsertClient};
use vrepl_ctl::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "vrepl-bench")]
#[command(about = "Measure concurrent insert throughput against one cluster", long_about = None)]
struct BenchArgs {
    #[arg(long, env = "SOURCE_ADDR", default_value = "http://127.0.0.1:19530")]
    addr: String,

    #[arg(long, default_value = "hello_milvus")]
    collection: String,

    #[arg(long, default_value_t = 1024)]
    dim: usize,

    /// Vectors per insert call.
    #[arg(long, default_value_t = 1)]
    rows: usize,

    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Insert calls per worker.
    #[arg(long, default_value_t = 100)]
    inserts: usize,

    #[arg(long, default_value_t = 64)]
    queue_depth: usize,

    #[arg(long, env = "VREPL_TOKEN")]
    token: Option<String>,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = BenchArgs::parse();
    let config = BenchConfig {
        collection: args.collection,
        dim: args.dim,
        rows: args.rows,
        concurrency: args.concurrency,
        inserts_per_worker: args.inserts,
        queue_depth: args.queue_depth,
    };
    let timeout = Duration::from_secs(args.timeout_secs);

    tracing::info!(addr = %args.addr, concurrency = config.concurrency, "starting insert benchmark");
    let report = run_benchmark(&config, || {
        HttpInsertClient::new(&args.addr, args.token.clone(), timeout)
    })
    .await?;

    println!("{}", report);
    Ok(())
}
