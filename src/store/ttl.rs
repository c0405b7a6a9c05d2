//! Key/value store whose entries expire when not refreshed within a TTL.

use std::borrow::Borrow;
use std::collections::hash_map::{Entry, HashMap};
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Slot<V> {
    value: V,
    touched: Instant,
}

impl<V> Slot<V> {
    fn new(value: V, now: Instant) -> Self {
        Self { value, touched: now }
    }

    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.touched) >= ttl
    }
}

/// TTL-bounded map. No ordering guarantee on listing.
#[derive(Debug, Clone)]
pub struct TtlStore<K, V> {
    ttl: Duration,
    entries: HashMap<K, Slot<V>>,
}

impl<K, V> TtlStore<K, V>
where
    K: Eq + Hash,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or replace `key`, restarting its TTL.
    pub fn add(&mut self, key: K, value: V) {
        self.entries.insert(key, Slot::new(value, Instant::now()));
    }

    /// Live value for `key`, `None` when absent or expired.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|slot| !slot.is_expired(now, self.ttl))
            .map(|slot| &slot.value)
    }

    /// Mutable access without refreshing the TTL. Drops the entry if expired.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let now = Instant::now();
        let expired = self
            .entries
            .get(key)
            .is_some_and(|slot| slot.is_expired(now, self.ttl));
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get_mut(key).map(|slot| &mut slot.value)
    }

    /// Refresh `key`, creating it with `init` when absent or expired.
    pub fn touch_or_insert_with<F>(&mut self, key: K, init: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let now = Instant::now();
        let ttl = self.ttl;
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now, ttl) {
                    occupied.insert(Slot::new(init(), now));
                } else {
                    occupied.get_mut().touched = now;
                }
                &mut occupied.into_mut().value
            }
            Entry::Vacant(vacant) => &mut vacant.insert(Slot::new(init(), now)).value,
        }
    }

    /// All live entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        let now = Instant::now();
        let ttl = self.ttl;
        self.entries
            .iter()
            .filter(move |(_, slot)| !slot.is_expired(now, ttl))
            .map(|(key, slot)| (key, &slot.value))
    }

    /// All live values, in no particular order.
    pub fn list(&self) -> Vec<&V> {
        self.iter().map(|(_, value)| value).collect()
    }

    /// Remove expired entries, returning how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, slot| !slot.is_expired(now, ttl));
        before - self.entries.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
