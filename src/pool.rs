//! Core pool implementation

use crate::config::{DisposeFn, FactoryFn, PoolConfiguration};
use crate::errors::{PoolError, PoolResult};
use crate::item::{PooledItem, SharedValue};
use crate::metrics::{MetricsTracker, PoolMetrics};
#[cfg(feature = "metrics")]
use crate::metrics::MetricsExporter;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use log::{debug, trace, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared state behind every [`Pool`] clone and referenced weakly by items
pub(crate) struct PoolInner<T, E> {
    idle_tx: Sender<SharedValue<T>>,
    idle_rx: Receiver<SharedValue<T>>,
    /// Values constructed and not yet removed. Growth happens under this lock.
    live: Mutex<usize>,
    closed: AtomicBool,
    max_size: usize,
    timeout: Duration,
    factory: FactoryFn<T, E>,
    disposer: Option<DisposeFn<T, E>>,
    metrics: MetricsTracker,
}

impl<T, E> PoolInner<T, E> {
    /// Construct one value if below capacity and park it in the idle queue.
    fn grow(&self) -> PoolResult<(), E> {
        let mut live = self.live.lock();
        if *live >= self.max_size {
            trace!("Pool at capacity ({}), waiting for an idle value", self.max_size);
            return Ok(());
        }

        let value = (self.factory)().map_err(|e| {
            MetricsTracker::bump(&self.metrics.factory_failures);
            debug!("Factory failed, live count stays at {}", *live);
            PoolError::Factory(e)
        })?;

        // idle <= live < max_size and the receiver lives in `self`
        let sent = self.idle_tx.try_send(Arc::new(Mutex::new(value)));
        debug_assert!(sent.is_ok(), "idle queue rejected a value below capacity");
        if sent.is_err() {
            return Ok(());
        }
        *live += 1;
        MetricsTracker::bump(&self.metrics.created);
        debug!("Created value {} of {}", *live, self.max_size);
        Ok(())
    }

    pub(crate) fn restore(&self, value: SharedValue<T>) {
        MetricsTracker::bump(&self.metrics.restored);
        if self.closed.load(Ordering::Acquire) {
            warn!("Value restored after shutdown, dropping it");
            self.release_slot();
            return;
        }
        if self.idle_tx.try_send(value).is_err() {
            warn!("Idle queue is full, dropping restored value");
            self.release_slot();
        }
    }

    pub(crate) fn remove(&self) {
        MetricsTracker::bump(&self.metrics.removed);
        self.release_slot();
    }

    fn release_slot(&self) {
        let mut live = self.live.lock();
        debug_assert!(*live > 0, "released a slot of an empty pool");
        *live = live.saturating_sub(1);
        trace!("Freed a slot, live count now {}", *live);
    }
}

/// Thread-safe pool that constructs values lazily, up to a fixed capacity
///
/// Cloning a `Pool` is cheap and yields another handle to the same pool.
///
/// # Examples
///
/// ```
/// use lazy_objectpool::{Pool, PoolConfiguration};
/// use std::time::Duration;
///
/// let config = PoolConfiguration::<_, String>::new()
///     .with_factory(|| Ok(String::from("connection")))
///     .with_max_pool_size(2)
///     .with_timeout(Duration::from_millis(100));
/// let pool = Pool::new(config).unwrap();
///
/// let first = pool.acquire().unwrap();
/// let second = pool.acquire().unwrap();
/// assert!(pool.acquire().unwrap_err().is_timeout());
///
/// first.restore().unwrap();
/// second.remove().unwrap();
/// assert_eq!(pool.live_count(), 1);
/// ```
pub struct Pool<T, E> {
    inner: Arc<PoolInner<T, E>>,
}

impl<T, E> Clone for Pool<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for Pool<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("max_size", &self.inner.max_size)
            .field("timeout", &self.inner.timeout)
            .field("live", &*self.inner.live.lock())
            .field("idle", &self.inner.idle_rx.len())
            .field("closed", &self.inner.closed.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T, E> Pool<T, E>
where
    T: Send + 'static,
    E: 'static,
{
    /// Create a new pool. Nothing is constructed until the first acquisition.
    ///
    /// Fails with [`PoolError::MissingFactory`] if no factory was configured.
    pub fn new(config: PoolConfiguration<T, E>) -> PoolResult<Self, E> {
        let config = config.normalized();
        let factory = config.factory.ok_or(PoolError::MissingFactory)?;
        let (idle_tx, idle_rx) = channel::bounded(config.max_pool_size);

        debug!(
            "Created pool with capacity {} and timeout {:?}",
            config.max_pool_size, config.operation_timeout
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                idle_tx,
                idle_rx,
                live: Mutex::new(0),
                closed: AtomicBool::new(false),
                max_size: config.max_pool_size,
                timeout: config.operation_timeout,
                factory,
                disposer: config.disposer,
                metrics: MetricsTracker::new(),
            }),
        })
    }

    /// Get a value from the pool, blocking up to the configured timeout.
    ///
    /// When no value is idle and the pool is below capacity, one value is
    /// constructed first. A caller that finds the pool at capacity only waits
    /// for a value to be restored; it does not construct one itself if a slot
    /// is freed by a removal while it waits.
    pub fn acquire(&self) -> PoolResult<PooledItem<T, E>, E> {
        let inner = &self.inner;
        if inner.closed.load(Ordering::Acquire) {
            return Err(PoolError::Closed);
        }

        if inner.idle_rx.is_empty() {
            inner.grow()?;
        }

        match inner.idle_rx.recv_timeout(inner.timeout) {
            Ok(value) => {
                MetricsTracker::bump(&inner.metrics.acquired);
                Ok(PooledItem::new(value, Arc::downgrade(inner)))
            }
            Err(RecvTimeoutError::Timeout) => {
                MetricsTracker::bump(&inner.metrics.timeouts);
                debug!("Timed out after {:?} waiting for a value", inner.timeout);
                Err(PoolError::Timeout(inner.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(PoolError::Closed),
        }
    }

    /// Get a value asynchronously. The blocking wait runs on tokio's blocking pool.
    pub async fn acquire_async(&self) -> PoolResult<PooledItem<T, E>, E>
    where
        E: Send,
    {
        let pool = self.clone();
        tokio::task::spawn_blocking(move || pool.acquire())
            .await
            .map_err(|_| PoolError::Cancelled)?
    }

    /// Maximum number of values constructed at the same time
    pub fn size(&self) -> usize {
        self.inner.max_size
    }

    /// Maximum wait of a single acquisition
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Values currently constructed, idle or checked out
    pub fn live_count(&self) -> usize {
        *self.inner.live.lock()
    }

    /// Values currently idle
    pub fn idle_count(&self) -> usize {
        self.inner.idle_rx.len()
    }

    /// Close the pool and dispose every idle value.
    ///
    /// Stops at the first disposal failure and returns it; idle values behind
    /// the failing one are left undisposed. Checked-out items are not touched.
    /// No acquisition may run concurrently with shutdown.
    pub fn shutdown(&self) -> PoolResult<(), E> {
        let inner = &self.inner;
        let mut live = inner.live.lock();
        inner.closed.store(true, Ordering::Release);
        debug!("Shutting down pool with {} idle values", inner.idle_rx.len());

        while let Ok(value) = inner.idle_rx.try_recv() {
            *live = live.saturating_sub(1);
            if let Some(dispose) = &inner.disposer {
                dispose(&*value.lock()).map_err(|e| {
                    warn!("Disposal failed, {} idle values left undisposed", inner.idle_rx.len());
                    PoolError::Disposal(e)
                })?;
                MetricsTracker::bump(&inner.metrics.disposed);
            }
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        let live = self.live_count();
        let idle = self.idle_count();
        self.inner.metrics.get_metrics(live, idle, self.inner.max_size)
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Export metrics in Prometheus format
    #[cfg(feature = "metrics")]
    pub fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        MetricsExporter::export_prometheus(&self.get_metrics(), pool_name, tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Disposition;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    fn counting_pool(size: usize, timeout: Duration) -> (Pool<usize, Boom>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let config = PoolConfiguration::new()
            .with_factory(move || Ok(counter.fetch_add(1, Ordering::SeqCst)))
            .with_max_pool_size(size)
            .with_timeout(timeout);
        (Pool::new(config).unwrap(), calls)
    }

    #[test]
    fn test_missing_factory() {
        let result = Pool::<u8, Boom>::new(PoolConfiguration::new());
        assert_eq!(result.unwrap_err(), PoolError::MissingFactory);
    }

    #[test]
    fn test_defaults() {
        let pool = Pool::<u8, Boom>::new(
            PoolConfiguration::new()
                .with_factory(|| Ok(0))
                .with_max_pool_size(0)
                .with_timeout(Duration::ZERO),
        )
        .unwrap();
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_grows_without_waiting() {
        let (pool, calls) = counting_pool(3, Duration::from_secs(10));
        let start = Instant::now();
        let item = pool.acquire().unwrap();

        assert_eq!(*item.value(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(pool.live_count(), 1);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_reuses_values() {
        let (pool, calls) = counting_pool(10, Duration::from_millis(100));
        for _ in 0..5 {
            let item = pool.acquire().unwrap();
            assert_eq!(*item.value(), 0);
            item.restore().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_factory_error_consumes_no_slot() {
        let config = PoolConfiguration::<u8, Boom>::new().with_factory(|| Err(Boom));
        let pool = Pool::new(config).unwrap();

        assert_eq!(pool.acquire().unwrap_err(), PoolError::Factory(Boom));
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.get_metrics().factory_failures, 1);
    }

    #[test]
    fn test_dropping_active_item_frees_slot() {
        let (pool, calls) = counting_pool(1, Duration::from_millis(100));
        drop(pool.acquire().unwrap());
        assert_eq!(pool.live_count(), 0);

        let item = pool.acquire().unwrap();
        assert_eq!(*item.value(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_mutation_survives_restore() {
        let config = PoolConfiguration::<Vec<u8>, Boom>::new().with_factory(|| Ok(Vec::new()));
        let pool = Pool::new(config).unwrap();

        let item = pool.acquire().unwrap();
        item.value_mut().extend_from_slice(b"hello");
        item.restore().unwrap();

        let again = pool.acquire().unwrap();
        assert_eq!(again.value().as_slice(), b"hello");
        assert_eq!(pool.get_metrics().total_created, 1);
    }

    #[test]
    fn test_pools_values_that_are_not_sync() {
        use std::cell::Cell;

        let config = PoolConfiguration::<Cell<u32>, Boom>::new().with_factory(|| Ok(Cell::new(0)));
        let pool = Pool::new(config).unwrap();

        let worker = {
            let pool = pool.clone();
            std::thread::spawn(move || {
                let item = pool.acquire().unwrap();
                item.value().set(5);
                item.restore().unwrap();
            })
        };
        worker.join().unwrap();

        let item = pool.acquire().unwrap();
        assert_eq!(item.value().get(), 5);
    }

    #[test]
    fn test_acquire_after_shutdown() {
        let (pool, _) = counting_pool(1, Duration::from_millis(100));
        pool.shutdown().unwrap();
        assert!(pool.is_closed());
        assert_eq!(pool.acquire().unwrap_err(), PoolError::Closed);
    }

    #[test]
    fn test_restore_after_shutdown_frees_slot() {
        let (pool, _) = counting_pool(1, Duration::from_millis(100));
        let item = pool.acquire().unwrap();
        pool.shutdown().unwrap();

        item.restore().unwrap();
        assert_eq!(item.disposition(), Disposition::Restored);
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_item_outlives_pool() {
        let (pool, _) = counting_pool(1, Duration::from_millis(100));
        let item = pool.acquire().unwrap();
        drop(pool);

        assert_eq!(*item.value(), 0);
        item.restore().unwrap();
    }

    #[test]
    fn test_metrics_track_operations() {
        let (pool, _) = counting_pool(1, Duration::from_millis(20));
        let item = pool.acquire().unwrap();
        assert!(pool.acquire().unwrap_err().is_timeout());
        item.remove().unwrap();

        let metrics = pool.get_metrics();
        assert_eq!(metrics.total_created, 1);
        assert_eq!(metrics.total_acquired, 1);
        assert_eq!(metrics.total_removed, 1);
        assert_eq!(metrics.timeouts, 1);
        assert_eq!(metrics.live_values, 0);
        assert_eq!(pool.export_metrics()["timeouts"], "1");
    }

    #[tokio::test]
    async fn test_async_acquire() {
        let (pool, _) = counting_pool(1, Duration::from_millis(50));
        let item = pool.acquire_async().await.unwrap();
        assert_eq!(*item.value(), 0);

        let err = pool.acquire_async().await.unwrap_err();
        assert_eq!(err, PoolError::Timeout(Duration::from_millis(50)));
        item.restore().unwrap();
    }
}
