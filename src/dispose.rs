//! Teardown of idle values on shutdown

/// A value that owns something which must be torn down explicitly,
/// such as a socket or a file handle.
///
/// Plug it into a pool with
/// [`PoolConfiguration::with_disposal`](crate::PoolConfiguration::with_disposal).
/// [`Pool::shutdown`](crate::Pool::shutdown) calls it for every idle value.
///
/// # Examples
///
/// ```
/// use lazy_objectpool::{Dispose, Pool, PoolConfiguration};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct Conn {
///     open: AtomicBool,
/// }
///
/// impl Dispose for Conn {
///     type Error = std::io::Error;
///
///     fn dispose(&self) -> Result<(), Self::Error> {
///         self.open.store(false, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let config = PoolConfiguration::new()
///     .with_factory(|| Ok(Conn { open: AtomicBool::new(true) }))
///     .with_disposal();
/// let pool = Pool::new(config).unwrap();
///
/// pool.acquire().unwrap().restore().unwrap();
/// assert!(pool.shutdown().is_ok());
/// ```
pub trait Dispose {
    type Error;

    /// Tear the value down. Values with nothing to release return `Ok(())`.
    fn dispose(&self) -> Result<(), Self::Error>;
}
