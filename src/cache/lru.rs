//! Ultra-hot tier: a small LRU map with no expiry
//!
//! Recency is positional. `order` runs from least to most recently used and
//! every hit moves the key to the back, so the front is always the eviction
//! victim.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

#[derive(Debug)]
pub(crate) struct UltraHotTier<K, V> {
    capacity: usize,
    entries: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K, V> UltraHotTier<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up `key` and mark it most recently used
    pub(crate) fn get(&mut self, key: &K) -> Option<&V> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.touch(key);
        self.entries.get(key)
    }

    /// Insert `key`, evicting the least recently used member when full
    ///
    /// Returns the evicted key, if any.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<K> {
        if self.entries.contains_key(&key) {
            self.entries.insert(key.clone(), value);
            self.touch(&key);
            return None;
        }

        let mut evicted = None;
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                evicted = Some(oldest);
            }
        }

        self.entries.insert(key.clone(), value);
        self.order.push_back(key);
        evicted
    }

    /// Replace the value of an existing member and mark it most recently used
    ///
    /// Returns false and does nothing if `key` is not a member.
    pub(crate) fn refresh(&mut self, key: &K, value: V) -> bool {
        match self.entries.get_mut(key) {
            Some(slot) => {
                *slot = value;
                self.touch(key);
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// Keys from least to most recently used
    #[cfg(test)]
    pub(crate) fn keys_lru_order(&self) -> Vec<K> {
        self.order.iter().cloned().collect()
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}
