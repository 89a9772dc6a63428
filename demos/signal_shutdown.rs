//! # Example: Signal-driven shutdown
//!
//! Runs a pool until the process receives SIGINT/SIGTERM (Ctrl-C), then
//! drains with the configured grace. Lifecycle events are rendered by the
//! built-in [`LogWriter`] subscriber.
//!
//! Run with: `cargo run --example signal_shutdown --features logging`

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use workgate::{JobError, JobFn, JobRef, JobSpec, LogWriter, PoolConfig, Subscribe, WorkerPool};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = PoolConfig {
        grace: Duration::from_secs(5),
        ..PoolConfig::default()
    };

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let pool = WorkerPool::builder(cfg).with_subscribers(subs).build();

    let heartbeat: JobRef = JobFn::arc("heartbeat", |ctx: CancellationToken| async move {
        tokio::select! {
            _ = ctx.cancelled() => Err(JobError::Canceled),
            _ = tokio::time::sleep(Duration::from_secs(1)) => {
                println!("[heartbeat] tick");
                Ok(())
            }
        }
    });
    pool.register(JobSpec::new(heartbeat, 2))?;

    println!("[main] running; press Ctrl-C to drain");
    pool.run_until_signal().await?;
    println!("[main] bye");

    Ok(())
}
