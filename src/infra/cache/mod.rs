//! In-process product cache.
//!
//! Entries hold the JSON encoding of a product under a `product:{id}` key and
//! are evicted least-recently-used once the configured capacity is reached.

mod lock;

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use tracing::debug;

use crate::application::cache::{CacheError, ProductCache};
use crate::domain::products::Product;

use lock::{rw_read, rw_write};

const SOURCE: &str = "products::cache";

pub const METRIC_CACHE_HIT: &str = "products_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "products_cache_miss_total";
pub const METRIC_CACHE_EVICT: &str = "products_cache_evict_total";

/// Cache key of a single product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductKey(i64);

impl ProductKey {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "product:{}", self.0)
    }
}

pub struct LruProductCache {
    entries: RwLock<LruCache<ProductKey, Bytes>>,
}

impl LruProductCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: i64) -> bool {
        rw_read(&self.entries, SOURCE, "contains").contains(&ProductKey::new(id))
    }
}

#[async_trait]
impl ProductCache for LruProductCache {
    async fn get(&self, id: i64) -> Result<Bytes, CacheError> {
        let key = ProductKey::new(id);
        // `LruCache::get` promotes the entry, so even reads take the write lock.
        let cached = rw_write(&self.entries, SOURCE, "get").get(&key).cloned();
        match cached {
            Some(bytes) => {
                counter!(METRIC_CACHE_HIT).increment(1);
                Ok(bytes)
            }
            None => {
                counter!(METRIC_CACHE_MISS).increment(1);
                Err(CacheError::NotFound { id })
            }
        }
    }

    async fn set(&self, product: &Product) -> Result<(), CacheError> {
        let encoded = serde_json::to_vec(product).map_err(CacheError::internal)?;
        let key = ProductKey::new(product.id);

        let evicted = rw_write(&self.entries, SOURCE, "set").push(key, Bytes::from(encoded));
        // `push` also hands back the old value when `key` was already cached.
        match evicted {
            Some((evicted_key, _)) if evicted_key != key => {
                counter!(METRIC_CACHE_EVICT).increment(1);
                debug!(target: SOURCE, key = %evicted_key, "evicted least recently used product");
            }
            _ => {}
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), CacheError> {
        rw_write(&self.entries, SOURCE, "delete_by_id")
            .pop(&ProductKey::new(id))
            .map(|_| ())
            .ok_or(CacheError::NotFound { id })
    }

    async fn clear(&self) -> Result<(), CacheError> {
        rw_write(&self.entries, SOURCE, "clear").clear();
        Ok(())
    }
}
