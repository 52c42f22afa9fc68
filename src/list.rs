use std::mem;

/// Position of an entry within an `LruList`.  Only valid while the entry is linked.
pub(crate) type Handle = usize;

struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<Handle>,
    next: Option<Handle>,
}

/// A doubly-linked list of `(key, value)` entries ordered from most recently used (front) to
/// least recently used (back).
///
/// # Implementation Notes:
///
/// Nodes live in a single `Vec` of slots and link to each other by slot index instead of by
/// pointer, so the list owns every entry outright and no reference counting is needed.  Slots
/// freed by `remove` are recycled by the next `push_front`, which keeps the backing store bounded
/// by the largest number of entries ever held at once.
pub(crate) struct LruList<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<Handle>,
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl<K, V> LruList<K, V> {
    pub fn with_capacity(capacity: usize) -> LruList<K, V> {
        LruList {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Insert `(key, value)` as the most recently used entry.
    ///
    /// # Returns
    ///
    /// The handle of the new entry.
    pub fn push_front(&mut self, key: K, value: V) -> Handle {
        let node = Node {
            key,
            value,
            prev: None,
            next: None,
        };

        let handle = match self.free.pop() {
            Some(handle) => {
                self.slots[handle] = Some(node);
                handle
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        self.link_front(handle);
        self.len += 1;
        handle
    }

    /// Mark the entry at `handle` as the most recently used.
    pub fn move_to_front(&mut self, handle: Handle) {
        if self.head == Some(handle) {
            return;
        }

        self.unlink(handle);
        self.link_front(handle);
    }

    /// Unlink the entry at `handle` and hand back its contents.  The slot is recycled.
    pub fn remove(&mut self, handle: Handle) -> (K, V) {
        self.unlink(handle);

        match self.slots[handle].take() {
            Some(node) => {
                self.free.push(handle);
                self.len -= 1;
                (node.key, node.value)
            }
            None => unreachable!("slot {} is not linked", handle),
        }
    }

    /// Key of the least recently used entry, if any.
    pub fn back(&self) -> Option<&K> {
        self.tail.map(|tail| &self.node(tail).key)
    }

    pub fn value(&self, handle: Handle) -> &V {
        &self.node(handle).value
    }

    /// Swap in a new value for the entry at `handle`, returning the old one.  Recency is untouched.
    pub fn replace(&mut self, handle: Handle, value: V) -> V {
        mem::replace(&mut self.node_mut(handle).value, value)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn node(&self, handle: Handle) -> &Node<K, V> {
        match self.slots[handle] {
            Some(ref node) => node,
            None => unreachable!("slot {} is not linked", handle),
        }
    }

    fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        match self.slots[handle] {
            Some(ref mut node) => node,
            None => unreachable!("slot {} is not linked", handle),
        }
    }

    /// Detach `handle` from its neighbours, leaving its own links cleared.
    fn unlink(&mut self, handle: Handle) {
        let (prev, next) = {
            let node = self.node_mut(handle);
            (node.prev.take(), node.next.take())
        };

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }

        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    /// Attach a detached `handle` ahead of the current head.
    fn link_front(&mut self, handle: Handle) {
        let old_head = self.head;
        self.node_mut(handle).next = old_head;

        match old_head {
            Some(old_head) => self.node_mut(old_head).prev = Some(handle),
            None => self.tail = Some(handle),
        }

        self.head = Some(handle);
    }
}

#[cfg(test)]
impl<K: Clone, V> LruList<K, V> {
    /// Keys from front to back, following `next` links.
    fn keys(&self) -> Vec<K> {
        let mut keys = Vec::new();
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            let node = self.node(handle);
            keys.push(node.key.clone());
            cursor = node.next;
        }
        keys
    }

    /// Keys from back to front, following `prev` links.
    fn keys_rev(&self) -> Vec<K> {
        let mut keys = Vec::new();
        let mut cursor = self.tail;
        while let Some(handle) = cursor {
            let node = self.node(handle);
            keys.push(node.key.clone());
            cursor = node.prev;
        }
        keys
    }
}
