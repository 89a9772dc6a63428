//! # Example: Keyed locks
//!
//! Eight tasks contend over two account keys. Same-account tasks serialize;
//! different accounts proceed in parallel. Once everyone is done the
//! registry is empty again.
//!
//! Run with: `cargo run --example keyed_locks`

use std::sync::Arc;
use std::time::Duration;

use workgate::KeyedMutex;

#[tokio::main]
async fn main() {
    let accounts: Arc<KeyedMutex<u64>> = Arc::new(KeyedMutex::new());

    let mut handles = Vec::new();
    for task in 0..8u32 {
        let accounts = Arc::clone(&accounts);
        let account = u64::from(task % 2);
        handles.push(tokio::spawn(async move {
            let guard = accounts.lock(account).await;
            println!("[task {task}] holding account {account}");
            tokio::time::sleep(Duration::from_millis(50)).await;
            println!("[task {task}] releasing account {account}");
            guard.unlock();
        }));
    }

    for h in handles {
        let _ = h.await;
    }

    println!("registry empty: {}", accounts.is_empty());
}
