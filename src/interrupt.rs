//! Critical sections
//!
//! [`Interrupts`] stands in for the global interrupt-enable flag. Holding a
//! [`CriticalSection`] means the compare-match handler cannot run, and the
//! handler itself runs inside one. Data shared with the handler lives in an
//! [`IsrMutex`], which can only be borrowed with a critical section token.
//!
//! Critical sections do not nest: code already holding a token must pass it
//! down rather than opening another one.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// The global interrupt gate.
#[derive(Debug, Default)]
pub struct Interrupts {
    gate: Mutex<()>,
}

/// Proof that interrupts are disabled. Dropping it re-enables them.
#[derive(Debug)]
pub struct CriticalSection<'a> {
    _gate: MutexGuard<'a, ()>,
}

impl Interrupts {
    pub const fn new() -> Self {
        Interrupts {
            gate: Mutex::new(()),
        }
    }

    /// Disables interrupts until the returned guard is dropped.
    pub fn disable(&self) -> CriticalSection<'_> {
        CriticalSection {
            _gate: self.gate.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Runs `f` with interrupts disabled.
    pub fn free<R>(&self, f: impl FnOnce(&CriticalSection<'_>) -> R) -> R {
        let cs = self.disable();
        f(&cs)
    }
}

/// Data shared between foreground code and the interrupt handler.
#[derive(Debug, Default)]
pub struct IsrMutex<T> {
    inner: Mutex<T>,
}

impl<T> IsrMutex<T> {
    pub const fn new(value: T) -> Self {
        IsrMutex {
            inner: Mutex::new(value),
        }
    }

    pub fn borrow<'cs>(&'cs self, _cs: &'cs CriticalSection<'_>) -> MutexGuard<'cs, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
