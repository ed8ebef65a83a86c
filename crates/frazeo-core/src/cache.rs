use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

struct Slot<V> {
    value: V,
    stamp: u64,
}

struct Inner<K, V> {
    map: HashMap<K, Slot<V>>,
    /// Recency order: smallest stamp is the least recently used key.
    order: BTreeMap<u64, K>,
    next_stamp: u64,
}

impl<K: Eq + Hash + Clone, V> Inner<K, V> {
    fn bump(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let stamp = self.bump();
        let Some(slot) = self.map.get_mut(key) else {
            return false;
        };
        let old = std::mem::replace(&mut slot.stamp, stamp);
        if let Some(k) = self.order.remove(&old) {
            self.order.insert(stamp, k);
        }
        true
    }

    fn evict_over(&mut self, capacity: usize) -> usize {
        let mut evicted = 0;
        while self.map.len() > capacity {
            let Some((_, key)) = self.order.pop_first() else {
                break;
            };
            self.map.remove(&key);
            evicted += 1;
        }
        evicted
    }
}

/// A capacity-bounded map with least-recently-used eviction.
///
/// One abstraction serves every cache role in Frazeo (embeddings, retrieval
/// results, navigation snapshots, per-conversation queries). All operations
/// take a short internal lock; callers never hold it while computing a value,
/// so expensive work such as embedding runs outside the critical section and
/// concurrent writers to the same key resolve as last-write-wins.
///
/// Values are returned by clone, so large payloads should be wrapped in
/// [`std::sync::Arc`].
pub struct BoundedCache<K, V> {
    role: &'static str,
    capacity: usize,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache for the given role holding at most `capacity` entries.
    ///
    /// A capacity of zero disables caching: inserts are dropped immediately.
    pub fn new(role: &'static str, capacity: usize) -> Self {
        Self {
            role,
            capacity,
            inner: Mutex::new(Inner {
                map: HashMap::with_capacity(capacity.min(4096)),
                order: BTreeMap::new(),
                next_stamp: 0,
            }),
        }
    }

    /// Look up a value and mark it as most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let mut inner = self.inner.lock();
        if !inner.touch(key) {
            return None;
        }
        inner.map.get(key).map(|slot| slot.value.clone())
    }

    /// Look up a value without affecting recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.inner.lock().map.get(key).map(|slot| slot.value.clone())
    }

    /// Insert or overwrite a value, evicting the least recently used entries
    /// if the cache grows past its capacity. Returns the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        if self.capacity == 0 {
            return None;
        }
        let mut inner = self.inner.lock();
        let stamp = inner.bump();
        let previous = match inner.map.insert(key.clone(), Slot { value, stamp }) {
            Some(old) => {
                inner.order.remove(&old.stamp);
                Some(old.value)
            }
            None => None,
        };
        inner.order.insert(stamp, key);
        let evicted = inner.evict_over(self.capacity);
        if evicted > 0 {
            tracing::trace!(role = self.role, evicted, "cache eviction");
        }
        previous
    }

    /// Return the cached value for `key`, computing and inserting it on a miss.
    ///
    /// `compute` runs without the lock held. If two callers miss on the same
    /// key concurrently both compute, and the later insert wins.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Remove a value, returning it if it was present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let mut inner = self.inner.lock();
        let slot = inner.map.remove(key)?;
        inner.order.remove(&slot.stamp);
        Some(slot.value)
    }

    /// Whether `key` is currently cached. Does not affect recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.inner.lock().map.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The role name used in log output.
    pub fn role(&self) -> &'static str {
        self.role
    }
}
