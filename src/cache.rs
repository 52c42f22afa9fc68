use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, trace, warn};

use crate::error::{CacheError, CacheResult};
use crate::list::{Handle, LruList};

/// Upper bound on the number of slots reserved up front, so huge capacities do not allocate
/// before they are used.
const MAX_PREALLOCATED: usize = 1024;

struct Inner<K, V> {
    map: HashMap<K, Handle>,
    lru_list: LruList<K, V>,
}

impl<K: Eq + Hash + Clone, V> Inner<K, V> {
    /// Make room for a new key.  If the cache is full, perform eviction.
    fn make_room(&mut self, capacity: usize) {
        if self.map.len() >= capacity {
            self.evict_lru();
        }
    }

    /// Perform lru eviction.
    ///
    /// The key leaves the map before its slot is freed: hashing it may panic, and the list must
    /// still be intact if it does.
    fn evict_lru(&mut self) {
        let handle = match self.lru_list.back() {
            Some(key) => self.map.remove(key),
            None => return,
        };

        match handle {
            Some(handle) => {
                self.lru_list.remove(handle);
            }
            None => unreachable!(),
        }
        trace!(len = self.map.len(), "evicted least recently used entry");
    }
}

impl<K, V> Inner<K, V> {
    /// Bring the map and list back in step after a panic inside a critical section.
    ///
    /// Every mutation touches the list only once the map work that can panic is done, so a
    /// length mismatch means the map lost entries while growing.  The handles can no longer be
    /// trusted, and the cache starts over empty.
    fn repair(&mut self) {
        if self.map.len() != self.lru_list.len() {
            warn!(
                map = self.map.len(),
                list = self.lru_list.len(),
                "lru cache out of step after a panic, clearing"
            );
            self.map.clear();
            self.lru_list.clear();
        }
    }
}

/// LRUCache implements an in-memory cache of fixed capacity with a least-recently-used replacement
/// policy, safe to share between threads.
///
/// The cache accepts any hashable and clonable value as a key type.  Keys are cloned because each
/// one is held twice: by the map, and by its list entry so that eviction can find the map entry
/// to drop.  Values are unconstrained, although `get` needs `V: Clone` since the value cannot be
/// borrowed past the lock; use `get_with` for anything else.
///
/// # Implementation Notes:
///
/// The LRUCache maintains a HashMap and a doubly-linked list to perform usage tracking.  The map
/// stores a handle into the list for each key, so that the LRU position of an entry can be
/// updated in O(1) time.  The list is arena backed (see `list.rs`): a `Vec` of slots linked by
/// index, which sidesteps self-referential structs entirely.
///
/// # Concurrency:
///
/// The map and the list are a single unit of state behind one `Mutex`.  Every public method holds
/// the lock for its whole duration, so operations are linearizable and neither structure is ever
/// observed out of step with the other.  Reads take the lock too, because a hit reorders the list.
///
/// Caller code runs under the lock: the key's `Hash`, `Eq` and `Clone` impls, `V::clone` in `get`,
/// and the closure given to `get_with`.  If any of them panics the lock is poisoned.  The poison is
/// cleared by the next caller rather than propagated, after checking that the map and the list
/// still agree (see `Inner::repair`).
pub struct LRUCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    capacity: NonZeroUsize,
}

impl<K: Eq + Hash + Clone, V> LRUCache<K, V> {
    /// Create a LRUCache with space for `capacity` items.
    pub fn new(capacity: NonZeroUsize) -> LRUCache<K, V> {
        let reserved = capacity.get().min(MAX_PREALLOCATED);
        debug!(capacity = capacity.get(), "creating lru cache");

        LRUCache {
            inner: Mutex::new(Inner {
                map: HashMap::with_capacity(reserved),
                lru_list: LruList::with_capacity(reserved),
            }),
            capacity,
        }
    }

    /// Create a LRUCache with space for `capacity` items.
    ///
    /// # Errors
    ///
    /// `CacheError::ZeroCapacity` if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> CacheResult<LRUCache<K, V>> {
        NonZeroUsize::new(capacity)
            .map(LRUCache::new)
            .ok_or(CacheError::ZeroCapacity)
    }

    /// Put `value` into `self` for `key`, marking it as the most recently used entry.
    ///
    /// Inserting a new key into a full cache first evicts the least recently used entry.  Replacing
    /// the value of an existing key never evicts.
    ///
    /// # Returns
    ///
    /// The previous value in the cache, or `None`.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let mut inner = self.lock();

        if let Some(&handle) = inner.map.get(&key) {
            let old_value = inner.lru_list.replace(handle, value);
            inner.lru_list.move_to_front(handle);
            return Some(old_value);
        }

        inner.make_room(self.capacity.get());

        // Grow the map before the list so a panicking hash cannot strand a list entry.
        let inner = &mut *inner;
        inner.map.reserve(1);
        match inner.map.entry(key) {
            Entry::Vacant(slot) => {
                let handle = inner.lru_list.push_front(slot.key().clone(), value);
                slot.insert(handle);
            }
            Entry::Occupied(_) => unreachable!(),
        }
        debug_assert_eq!(inner.map.len(), inner.lru_list.len());

        None
    }

    /// Get a copy of the value for `key` in `self`, if it exists.  Otherwise, return `None`.
    ///
    /// A hit counts as a use and refreshes the entry's recency.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get_with(key, V::clone)
    }

    /// Apply `f` to the value for `key` in `self` while the lock is held.
    ///
    /// Like `get`, a hit refreshes the entry's recency.  `f` must not call back into the cache.
    pub fn get_with<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        let mut inner = self.lock();
        let handle = *inner.map.get(key)?;

        inner.lru_list.move_to_front(handle);
        Some(f(inner.lru_list.value(handle)))
    }

    /// Returns `true` if `key` is present.  Recency is not refreshed.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().map.contains_key(key)
    }

    /// Remove `key` from `self`.  Removing an absent key does nothing.
    ///
    /// # Returns
    ///
    /// The removed value, or `None`.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.lock();
        let handle = inner.map.remove(key)?;
        let (_key, value) = inner.lru_list.remove(handle);

        Some(value)
    }
}

impl<K, V> LRUCache<K, V> {
    /// The maximum number of items permitted in the cache.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// The number of items currently in the cache.  May be stale as soon as it is returned if
    /// other threads are writing.
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.  The capacity is unchanged.
    pub fn clear(&self) {
        let mut inner = self.lock();
        let dropped = inner.map.len();

        inner.map.clear();
        inner.lru_list.clear();
        trace!(dropped, "cleared lru cache");
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                guard.repair();
                self.inner.clear_poison();
                guard
            }
        }
    }
}

impl<K, V> fmt::Debug for LRUCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LRUCache")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
