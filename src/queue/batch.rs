//! Keyed batching queue.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

#[derive(Debug)]
struct State<K, T> {
    /// Items waiting per key, in arrival order.
    pending: HashMap<K, Vec<T>>,
    /// Keys with pending items that are not checked out, FIFO.
    ready: VecDeque<K>,
    /// Keys currently held by a worker.
    processing: HashSet<K>,
    shutting_down: bool,
}

/// Queue that delivers all pending items of one key as a single batch.
#[derive(Debug)]
pub struct BatchQueue<K, T> {
    state: Mutex<State<K, T>>,
    notify: Notify,
}

impl<K, T> BatchQueue<K, T>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                pending: HashMap::new(),
                ready: VecDeque::new(),
                processing: HashSet::new(),
                shutting_down: false,
            }),
            notify: Notify::new(),
        }
    }

    // A panic while holding the lock leaves the maps consistent, so a
    // poisoned lock is safe to keep using.
    fn lock(&self) -> MutexGuard<'_, State<K, T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `item` to the pending batch of `key`.
    ///
    /// Returns false, dropping the item, once the queue is shut down.
    pub fn add(&self, key: K, item: T) -> bool {
        let mut state = self.lock();
        if state.shutting_down {
            return false;
        }

        let items = state.pending.entry(key.clone()).or_default();
        items.push(item);
        let first = items.len() == 1;

        if first && !state.processing.contains(&key) {
            state.ready.push_back(key);
            drop(state);
            self.notify.notify_one();
        }
        true
    }

    /// Wait for a ready key and take every item pending for it.
    ///
    /// Returns `None` once the queue is shut down and no ready key is left.
    pub async fn get(&self) -> Option<(K, Vec<T>)> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(key) = state.ready.pop_front() {
                    let items = state.pending.remove(&key).unwrap_or_default();
                    state.processing.insert(key.clone());
                    let more = !state.ready.is_empty();
                    drop(state);
                    if more {
                        // Pass the wakeup on so idle workers see the rest.
                        self.notify.notify_one();
                    }
                    return Some((key, items));
                }
                if state.shutting_down {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Release `key` after its batch was processed.
    pub fn done(&self, key: &K) {
        let mut state = self.lock();
        state.processing.remove(key);

        if state.pending.contains_key(key) {
            state.ready.push_back(key.clone());
            drop(state);
            self.notify.notify_one();
        }
    }

    /// Stop accepting items and release idle `get` callers once drained.
    pub fn shut_down(&self) {
        self.lock().shutting_down = true;
        self.notify.notify_waiters();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.lock().shutting_down
    }

    /// Number of keys waiting for delivery.
    pub fn len(&self) -> usize {
        self.lock().ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, T> Default for BatchQueue<K, T>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
