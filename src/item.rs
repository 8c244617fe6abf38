//! Handles returned by [`Pool::acquire`](crate::Pool::acquire)

use crate::errors::{PoolError, PoolResult};
use crate::pool::PoolInner;

use log::{debug, trace};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};

/// Where a [`PooledItem`] is in its lifecycle
///
/// `Active` is the initial state. `Restored` and `Removed` are terminal and
/// each item reaches exactly one of them, exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Checked out, not yet disposed
    Active,

    /// Handed back to the pool for reuse
    Restored,

    /// Discarded, its slot freed for a replacement
    Removed,
}

impl Disposition {
    const fn as_u8(self) -> u8 {
        match self {
            Disposition::Active => 0,
            Disposition::Restored => 1,
            Disposition::Removed => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Disposition::Active,
            1 => Disposition::Restored,
            2 => Disposition::Removed,
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Disposition::Active => "active",
            Disposition::Restored => "restored",
            Disposition::Removed => "removed",
        })
    }
}

/// A value shared between the idle queue and the items that checked it out
pub(crate) type SharedValue<T> = Arc<Mutex<T>>;

/// A value checked out of a [`Pool`](crate::Pool)
///
/// Access goes through a lock guard, so the value can be read or mutated.
/// The handle keeps its access after disposition; a guard held on a restored
/// item blocks whoever checked the value out next.
///
/// Dispose of it with exactly one call to [`restore`](Self::restore) or
/// [`remove`](Self::remove). A second call returns
/// [`PoolError::AlreadyDisposed`]. Dropping an item that is still active
/// removes it, so a lost handle never pins a slot.
///
/// # Examples
///
/// ```
/// use lazy_objectpool::{Disposition, Pool, PoolConfiguration};
///
/// let pool = Pool::new(PoolConfiguration::<_, String>::new().with_factory(|| Ok("value")))
///     .unwrap();
///
/// let item = pool.acquire().unwrap();
/// assert_eq!(*item.value(), "value");
///
/// item.restore().unwrap();
/// assert_eq!(item.disposition(), Disposition::Restored);
/// assert!(item.restore().unwrap_err().is_misuse());
/// ```
pub struct PooledItem<T, E> {
    value: SharedValue<T>,
    disposition: AtomicU8,
    pool: Weak<PoolInner<T, E>>,
}

impl<T, E> PooledItem<T, E> {
    pub(crate) fn new(value: SharedValue<T>, pool: Weak<PoolInner<T, E>>) -> Self {
        Self {
            value,
            disposition: AtomicU8::new(Disposition::Active.as_u8()),
            pool,
        }
    }

    /// Lock the held value for reading. Still available after disposition.
    pub fn value(&self) -> MutexGuard<'_, T> {
        self.value.lock()
    }

    /// Lock the held value for writing.
    ///
    /// Changes made before [`restore`](Self::restore) are seen by the next
    /// caller that acquires the value.
    pub fn value_mut(&self) -> MutexGuard<'_, T> {
        self.value.lock()
    }

    pub fn disposition(&self) -> Disposition {
        Disposition::from_u8(self.disposition.load(Ordering::Acquire))
    }

    /// Hand the value back to the pool for reuse.
    pub fn restore(&self) -> PoolResult<(), E> {
        self.settle(Disposition::Restored)?;
        match self.pool.upgrade() {
            Some(pool) => pool.restore(Arc::clone(&self.value)),
            None => trace!("Pool is gone, dropping restored value"),
        }
        Ok(())
    }

    /// Discard the value and free its slot so the pool may construct a replacement.
    pub fn remove(&self) -> PoolResult<(), E> {
        self.settle(Disposition::Removed)?;
        match self.pool.upgrade() {
            Some(pool) => pool.remove(),
            None => trace!("Pool is gone, dropping removed value"),
        }
        Ok(())
    }

    /// Move from `Active` to `target`, at most once over the item's lifetime.
    fn settle(&self, target: Disposition) -> PoolResult<(), E> {
        self.disposition
            .compare_exchange(
                Disposition::Active.as_u8(),
                target.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|previous| PoolError::AlreadyDisposed(Disposition::from_u8(previous)))
    }
}

impl<T, E> Drop for PooledItem<T, E> {
    fn drop(&mut self) {
        if self.settle(Disposition::Removed).is_ok() {
            debug!("Active item dropped without disposition, removing it");
            if let Some(pool) = self.pool.upgrade() {
                pool.remove();
            }
        }
    }
}

impl<T: fmt::Debug, E> fmt::Debug for PooledItem<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledItem")
            .field("value", &self.value.try_lock())
            .field("disposition", &self.disposition())
            .finish()
    }
}
