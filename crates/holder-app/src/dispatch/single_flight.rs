//! Coalescing of concurrent identical operations.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

struct Entry<V> {
    id: u64,
    future: Shared<BoxFuture<'static, V>>,
    waiters: usize,
}

/// Result of [`SingleFlight::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flight<V> {
    /// Outcome shared by every caller of the flight
    pub value: V,
    /// This caller started the flight
    pub leader: bool,
}

/// At most one in-flight operation per key.
///
/// The first caller for a key starts the operation; callers arriving while it
/// runs await the same future and receive a clone of its output. The entry is
/// dropped once the operation completes, so the next call starts afresh.
///
/// If every caller is dropped before completion the entry stays, and the next
/// caller for the key resumes the same operation.
pub struct SingleFlight<K, V> {
    inflight: Mutex<HashMap<K, Entry<V>>>,
    next_id: AtomicU64,
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    /// Empty registry
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Run `start()` unless an operation for `key` is already in flight, in
    /// which case join it.
    pub async fn run<F, Fut>(&self, key: K, start: F) -> Flight<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let (id, future, leader) = {
            let mut inflight = self.inflight.lock();
            match inflight.get_mut(&key) {
                Some(entry) => {
                    entry.waiters += 1;
                    (entry.id, entry.future.clone(), false)
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let future = start().boxed().shared();
                    inflight.insert(
                        key.clone(),
                        Entry {
                            id,
                            future: future.clone(),
                            waiters: 1,
                        },
                    );
                    (id, future, true)
                }
            }
        };

        let waiter = Waiter {
            flight: self,
            key: &key,
            id,
        };
        let value = future.await;
        self.complete(&key, id);
        drop(waiter);

        Flight { value, leader }
    }

    /// Whether an operation for `key` is running
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.inflight.lock().contains_key(key)
    }

    /// Callers currently awaiting the operation for `key`
    pub fn waiters(&self, key: &K) -> usize {
        self.inflight.lock().get(key).map_or(0, |e| e.waiters)
    }

    /// Remove the entry for a finished flight; a newer flight under the same
    /// key is left alone.
    fn complete(&self, key: &K, id: u64) {
        let mut inflight = self.inflight.lock();
        if inflight.get(key).is_some_and(|e| e.id == id) {
            inflight.remove(key);
        }
    }

    fn leave(&self, key: &K, id: u64) {
        let mut inflight = self.inflight.lock();
        if let Some(entry) = inflight.get_mut(key) {
            if entry.id == id {
                entry.waiters = entry.waiters.saturating_sub(1);
            }
        }
    }
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for SingleFlight<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("inflight", &self.inflight.lock().len())
            .finish()
    }
}

/// Decrements the waiter count when a caller finishes or is dropped.
struct Waiter<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    flight: &'a SingleFlight<K, V>,
    key: &'a K,
    id: u64,
}

impl<K, V> Drop for Waiter<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.flight.leave(self.key, self.id);
    }
}
