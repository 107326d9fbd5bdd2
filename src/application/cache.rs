//! Cache port used by the product service.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::domain::products::Product;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("product {id} not found in cache")]
    NotFound { id: i64 },
    #[error("{0}")]
    Internal(String),
}

impl CacheError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Volatile product cache keyed by product id. Never authoritative.
#[async_trait]
pub trait ProductCache: Send + Sync {
    /// Return the JSON encoding of a cached product.
    async fn get(&self, id: i64) -> Result<Bytes, CacheError>;

    async fn set(&self, product: &Product) -> Result<(), CacheError>;

    /// Drop one entry; `NotFound` when nothing was cached under `id`.
    async fn delete_by_id(&self, id: i64) -> Result<(), CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;
}
