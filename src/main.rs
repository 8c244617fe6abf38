// lazy_objectpool
// Bounded, lazily populated resource pool

// This is just a binary wrapper - the actual library is in lib.rs
// Run examples with: cargo run --example basic

use lazy_objectpool::{Pool, PoolConfiguration, PoolResult};

fn main() -> PoolResult<(), String> {
    println!("=== lazy_objectpool ===");
    println!("See demos/ directory for usage examples");
    println!("Run: cargo run --example basic");
    println!();

    // Quick demo
    println!("Quick Demo:");
    let config = PoolConfiguration::new()
        .with_factory(|| Ok(String::from("connection")))
        .with_max_pool_size(2);
    let pool = Pool::new(config)?;

    let item = pool.acquire()?;
    println!("  Got value: {}", *item.value());
    item.restore()?;

    println!("  Idle after restore: {}", pool.idle_count());
    pool.shutdown()
}
