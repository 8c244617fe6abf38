//! # lazy_objectpool
//!
//! Bounded, thread-safe resource pool for values that are expensive to build,
//! such as connections or large buffers.
//!
//! ## Features
//!
//! - Lazy construction through a caller-supplied factory, up to a fixed capacity
//! - Blocking acquisition bounded by a per-pool timeout
//! - Explicit, exactly-once disposition of each handle: restore or remove
//! - Removed values free their slot for a replacement
//! - Teardown of idle values on shutdown
//! - Async acquisition on tokio
//! - Metrics and Prometheus export
//!
//! ## Quick Start
//!
//! ```rust
//! use lazy_objectpool::{Pool, PoolConfiguration};
//!
//! let config = PoolConfiguration::<_, std::io::Error>::new()
//!     .with_factory(|| Ok(vec![0u8; 1024]))
//!     .with_max_pool_size(4);
//! let pool = Pool::new(config).unwrap();
//!
//! let buffer = pool.acquire().unwrap();
//! println!("Got a buffer of {} bytes", buffer.value().len());
//! buffer.restore().unwrap();
//! ```

mod config;
mod dispose;
mod errors;
mod item;
mod metrics;
mod pool;

pub use config::{PoolConfiguration, DEFAULT_MAX_POOL_SIZE, DEFAULT_TIMEOUT};
pub use dispose::Dispose;
pub use errors::{PoolError, PoolResult};
pub use item::{Disposition, PooledItem};
#[cfg(feature = "metrics")]
pub use metrics::MetricsExporter;
pub use metrics::PoolMetrics;
pub use pool::Pool;
