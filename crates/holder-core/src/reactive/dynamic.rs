//! Versioned reactive cell.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

struct Cell<T> {
    value: RwLock<T>,
    version: AtomicU64,
}

impl<T: Clone> Cell<T> {
    fn read(&self) -> T {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A shared value replaced wholesale, with a version bumped on every write.
///
/// Clones share the same cell. A reader never observes a partially written
/// value: writes swap the whole `T` under the lock.
pub struct Dynamic<T> {
    cell: Arc<Cell<T>>,
}

impl<T> Clone for Dynamic<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Dynamic<T> {
    /// Create a cell at version 0.
    pub fn new(value: T) -> Self {
        Self {
            cell: Arc::new(Cell {
                value: RwLock::new(value),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Clone of the current value
    pub fn get(&self) -> T {
        self.cell.read()
    }

    /// Number of writes so far
    pub fn version(&self) -> u64 {
        self.cell.version.load(Ordering::Acquire)
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        {
            let mut guard = self
                .cell
                .value
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *guard = value;
        }
        self.cell.version.fetch_add(1, Ordering::Release);
    }

    /// Replace the value with `f(current)`.
    ///
    /// The read and the write happen under one write lock, so concurrent
    /// updates are not lost.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        {
            let mut guard = self
                .cell
                .value
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let next = f(&guard);
            *guard = next;
        }
        self.cell.version.fetch_add(1, Ordering::Release);
    }

    /// Poll-based subscription starting at the current version.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            cell: Arc::clone(&self.cell),
            seen: self.version(),
        }
    }
}

impl<T: Clone + Send + Sync + Default + 'static> Default for Dynamic<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + Sync + fmt::Debug + 'static> fmt::Debug for Dynamic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dynamic")
            .field("value", &self.get())
            .field("version", &self.version())
            .finish()
    }
}

/// Change detector over a [`Dynamic`].
pub struct Subscription<T> {
    cell: Arc<Cell<T>>,
    seen: u64,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    /// Whether a write happened since the last poll
    pub fn has_changed(&self) -> bool {
        self.cell.version.load(Ordering::Acquire) > self.seen
    }

    /// The current value if it changed since the last poll.
    pub fn poll(&mut self) -> Option<T> {
        let version = self.cell.version.load(Ordering::Acquire);
        if version > self.seen {
            self.seen = version;
            Some(self.cell.read())
        } else {
            None
        }
    }

    /// The current value, changed or not
    pub fn get(&self) -> T {
        self.cell.read()
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("seen", &self.seen)
            .finish_non_exhaustive()
    }
}
