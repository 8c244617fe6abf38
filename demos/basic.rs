//! Basic usage examples for Pool

use lazy_objectpool::{Dispose, Pool, PoolConfiguration};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct Connection {
    id: usize,
}

impl Dispose for Connection {
    type Error = std::io::Error;

    fn dispose(&self) -> Result<(), Self::Error> {
        println!("   Closing connection {}", self.id);
        Ok(())
    }
}

fn connection_pool(size: usize) -> Pool<Connection, std::io::Error> {
    let next_id = Arc::new(AtomicUsize::new(0));
    let config = PoolConfiguration::new()
        .with_factory(move || {
            Ok(Connection {
                id: next_id.fetch_add(1, Ordering::Relaxed),
            })
        })
        .with_max_pool_size(size)
        .with_timeout(Duration::from_millis(100))
        .with_disposal();

    Pool::new(config).unwrap()
}

fn main() {
    println!("=== lazy_objectpool - Basic Examples ===\n");

    // Example 1: Restore and reuse
    reuse();

    // Example 2: Timeouts at capacity
    timeout_at_capacity();

    // Example 3: Removing broken values
    remove_and_replace();

    // Example 4: Metrics and shutdown
    metrics_and_shutdown();
}

fn reuse() {
    println!("1. Restore and Reuse:");
    let pool = connection_pool(2);

    for _ in 0..3 {
        let conn = pool.acquire().unwrap();
        println!("   Got connection {}", conn.value().id);
        conn.restore().unwrap();
    }

    println!("   Live after three cycles: {}\n", pool.live_count());
}

fn timeout_at_capacity() {
    println!("2. Timeout at Capacity:");
    let pool = connection_pool(1);

    let held = pool.acquire().unwrap();
    match pool.acquire() {
        Ok(conn) => println!("   Unexpectedly got connection {}", conn.value().id),
        Err(e) => println!("   Error: {}", e),
    }
    held.restore().unwrap();
    println!();
}

fn remove_and_replace() {
    println!("3. Remove and Replace:");
    let pool = connection_pool(1);

    let broken = pool.acquire().unwrap();
    println!("   Removing connection {}", broken.value().id);
    broken.remove().unwrap();

    let fresh = pool.acquire().unwrap();
    println!("   Replacement is connection {}", fresh.value().id);

    if let Err(e) = fresh.remove() {
        println!("   Error: {}", e);
    }
    if let Err(e) = fresh.restore() {
        println!("   Second disposition rejected: {}\n", e);
    }
}

fn metrics_and_shutdown() {
    println!("4. Metrics and Shutdown:");
    let pool = connection_pool(3);

    let a = pool.acquire().unwrap();
    let b = pool.acquire().unwrap();
    a.restore().unwrap();
    b.restore().unwrap();

    println!("\n   Metrics:");
    for (key, value) in pool.export_metrics() {
        println!("     {}: {}", key, value);
    }

    println!();
    pool.shutdown().unwrap();
}
