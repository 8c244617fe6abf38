//! Async usage examples

use lazy_objectpool::{Pool, PoolConfiguration};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::main]
async fn main() {
    println!("=== lazy_objectpool - Async Examples ===\n");

    // Example 1: Async acquire
    async_acquire().await;

    // Example 2: Async with timeout
    async_with_timeout().await;

    // Example 3: Concurrent access
    concurrent_access().await;
}

fn buffer_pool(size: usize, timeout: Duration) -> Pool<Vec<u8>, String> {
    let config = PoolConfiguration::new()
        .with_factory(|| Ok(vec![0u8; 4096]))
        .with_max_pool_size(size)
        .with_timeout(timeout);
    Pool::new(config).unwrap()
}

async fn async_acquire() {
    println!("1. Async Acquire:");
    let pool = buffer_pool(1, Duration::from_secs(1));

    let buffer = pool.acquire_async().await.unwrap();
    println!("   Got a {} byte buffer asynchronously", buffer.value().len());
    buffer.restore().unwrap();

    println!();
}

async fn async_with_timeout() {
    println!("2. Async with Timeout:");
    let pool = buffer_pool(1, Duration::from_millis(100));

    // Hold the only value
    let held = pool.acquire().unwrap();

    match pool.acquire_async().await {
        Ok(_) => println!("   Got buffer"),
        Err(e) => println!("   Error: {}", e),
    }
    held.restore().unwrap();

    println!();
}

async fn concurrent_access() {
    println!("3. Concurrent Access:");
    let pool = buffer_pool(4, Duration::from_secs(5));

    let mut handles = vec![];
    for i in 0..10 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let buffer = pool.acquire_async().await.unwrap();
            buffer.value_mut()[0] = i as u8;
            sleep(Duration::from_millis(10)).await;
            buffer.restore().unwrap();
            i
        }));
    }

    for handle in handles {
        let task = handle.await.unwrap();
        println!("   Task {} finished", task);
    }

    println!("   Values constructed: {}", pool.get_metrics().total_created);
    println!();
}
