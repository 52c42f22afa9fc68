//! A thread-safe, fixed-capacity cache with a least-recently-used replacement policy.
//!
//! ```
//! use sync_lru_cache::LRUCache;
//!
//! let cache = LRUCache::with_capacity(2).unwrap();
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");
//! cache.put("c", 3);
//!
//! assert_eq!(cache.get(&"b"), None);
//! assert_eq!(cache.get(&"a"), Some(1));
//! ```

pub mod cache;
pub mod error;
mod list;

pub use cache::LRUCache;
pub use error::{CacheError, CacheResult};
