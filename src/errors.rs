//! Error types for the pool

use crate::item::Disposition;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by [`Pool`](crate::Pool) and [`PooledItem`](crate::PooledItem).
///
/// `E` is the error type of the factory and of the disposer.
///
/// `MissingFactory` and `AlreadyDisposed` are contract violations: they point
/// at a bug in the calling code and must not be handled as normal control flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError<E> {
    #[error("Pool configuration has no factory")]
    MissingFactory,

    #[error("Factory failed to create a value: {0}")]
    Factory(E),

    #[error("Timed out after {0:?} waiting for an available value")]
    Timeout(Duration),

    #[error("Failed to dispose an idle value: {0}")]
    Disposal(E),

    #[error("Item was already {0}")]
    AlreadyDisposed(Disposition),

    #[error("Pool has been shut down")]
    Closed,

    #[error("Operation was cancelled")]
    Cancelled,
}

impl<E> PoolError<E> {
    /// True if no value became available within the configured wait.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PoolError::Timeout(_))
    }

    /// True for errors caused by misusing the pool API.
    pub fn is_misuse(&self) -> bool {
        matches!(self, PoolError::MissingFactory | PoolError::AlreadyDisposed(_))
    }
}

pub type PoolResult<T, E> = Result<T, PoolError<E>>;
