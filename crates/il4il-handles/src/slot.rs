//! A mutex-guarded, consumable resource slot.

use crate::error::HandleError;
use std::sync::{Mutex, MutexGuard};

/// Owns a resource behind a mutex with take-to-consume semantics.
///
/// The slot holds `Some(value)` until something consumes it; afterwards every
/// access reports [`HandleError::Consumed`]. Accessors take closures so the
/// guard is released on every exit path, panics included, and no caller can
/// hold the lock across unrelated work.
#[derive(Debug)]
pub struct Slot<T> {
    value: Mutex<Option<T>>,
}

impl<T> Slot<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(Some(value)),
        }
    }

    // No invariant spans the lock, so a poisoned guard is safe to recover.
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.value.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` with shared access to the value.
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> Result<U, HandleError> {
        match self.lock().as_ref() {
            Some(value) => Ok(f(value)),
            None => Err(HandleError::Consumed),
        }
    }

    /// Runs `f` with exclusive access to the value.
    pub fn with_mut<U>(&self, f: impl FnOnce(&mut T) -> U) -> Result<U, HandleError> {
        match self.lock().as_mut() {
            Some(value) => Ok(f(value)),
            None => Err(HandleError::Consumed),
        }
    }

    /// Atomically empties the slot and returns the value. At most one caller
    /// ever gets it; the rest observe [`HandleError::Consumed`].
    pub fn take(&self) -> Result<T, HandleError> {
        self.lock().take().ok_or(HandleError::Consumed)
    }

    /// Consumes and drops the value. A second dispose is a detectable error,
    /// never undefined behavior.
    pub fn dispose(&self) -> Result<(), HandleError> {
        self.take().map(drop)
    }

    pub fn is_consumed(&self) -> bool {
        self.lock().is_none()
    }
}
