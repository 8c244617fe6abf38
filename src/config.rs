//! Pool configuration options

use crate::dispose::Dispose;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub(crate) type FactoryFn<T, E> = Arc<dyn Fn() -> Result<T, E> + Send + Sync>;
pub(crate) type DisposeFn<T, E> = Arc<dyn Fn(&T) -> Result<(), E> + Send + Sync>;

/// Default capacity when none (or zero) is configured
pub const DEFAULT_MAX_POOL_SIZE: usize = 1;

/// Default acquisition timeout when none (or zero) is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for pool behavior
///
/// # Examples
///
/// ```
/// use lazy_objectpool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::<Vec<u8>, std::io::Error>::new()
///     .with_factory(|| Ok(Vec::with_capacity(4096)))
///     .with_max_pool_size(8)
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.max_pool_size, 8);
/// assert_eq!(config.operation_timeout, Duration::from_secs(5));
/// assert!(config.has_factory());
/// ```
pub struct PoolConfiguration<T, E> {
    /// Maximum number of values that can be constructed at the same time
    pub max_pool_size: usize,

    /// Maximum wait of a single acquisition
    pub operation_timeout: Duration,

    pub(crate) factory: Option<FactoryFn<T, E>>,
    pub(crate) disposer: Option<DisposeFn<T, E>>,
}

impl<T, E> Default for PoolConfiguration<T, E> {
    fn default() -> Self {
        Self {
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            operation_timeout: DEFAULT_TIMEOUT,
            factory: None,
            disposer: None,
        }
    }
}

impl<T, E> Clone for PoolConfiguration<T, E> {
    fn clone(&self) -> Self {
        Self {
            max_pool_size: self.max_pool_size,
            operation_timeout: self.operation_timeout,
            factory: self.factory.clone(),
            disposer: self.disposer.clone(),
        }
    }
}

impl<T, E> fmt::Debug for PoolConfiguration<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfiguration")
            .field("max_pool_size", &self.max_pool_size)
            .field("operation_timeout", &self.operation_timeout)
            .field("factory", &self.factory.is_some())
            .field("disposer", &self.disposer.is_some())
            .finish()
    }
}

impl<T, E> PoolConfiguration<T, E> {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the function that constructs new values
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Set the maximum pool size
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_objectpool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::<i32, String>::new()
    ///     .with_max_pool_size(50);
    ///
    /// assert_eq!(config.max_pool_size, 50);
    /// ```
    pub fn with_max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    /// Set the acquisition timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Set a teardown function run on idle values at shutdown
    pub fn with_disposer<D>(mut self, disposer: D) -> Self
    where
        D: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
    {
        self.disposer = Some(Arc::new(disposer));
        self
    }

    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Replace out-of-range values with the defaults.
    pub(crate) fn normalized(mut self) -> Self {
        if self.max_pool_size == 0 {
            self.max_pool_size = DEFAULT_MAX_POOL_SIZE;
        }
        if self.operation_timeout.is_zero() {
            self.operation_timeout = DEFAULT_TIMEOUT;
        }
        self
    }
}

impl<T, E> PoolConfiguration<T, E>
where
    T: Dispose<Error = E> + 'static,
    E: 'static,
{
    /// Tear idle values down through their [`Dispose`] implementation at shutdown
    pub fn with_disposal(self) -> Self {
        self.with_disposer(|value: &T| value.dispose())
    }
}
