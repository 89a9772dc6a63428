//! # Example: Graceful drain
//!
//! Runs one job across three workers, then drains twice: first with a grace
//! shorter than an iteration (times out), then with a grace that lets the
//! in-flight iterations finish.
//!
//! Run with: `cargo run --example graceful_drain`

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use workgate::{JobError, JobFn, JobRef, JobSpec, PoolConfig, WorkerPool};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pool = WorkerPool::new(PoolConfig::default(), vec![]);

    let crunch: JobRef = JobFn::arc("crunch", |_ctx: CancellationToken| async move {
        println!("[crunch] iteration start (100ms)");
        tokio::time::sleep(Duration::from_millis(100)).await;
        println!("[crunch] iteration done");
        Ok::<(), JobError>(())
    });
    pool.register(JobSpec::new(crunch, 3))?;
    pool.run()?;

    tokio::time::sleep(Duration::from_millis(20)).await;

    println!("[main] draining with 50ms grace (expected to time out)");
    match pool.shutdown(Duration::from_millis(50)).await {
        Ok(()) => println!("[main] drained (unexpectedly fast)"),
        Err(e) => println!("[main] {e}"),
    }

    println!("[main] re-draining with 500ms grace");
    pool.shutdown(Duration::from_millis(500)).await?;
    println!("[main] drained; active={}", pool.active());

    Ok(())
}
