//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::PageWindow;
use crate::domain::products::{NewProduct, Product};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("failed to find product {id} in DB")]
    NotFound { id: i64 },
    #[error("{0}")]
    Persistence(String),
    #[error("database call exceeded its deadline")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Durable, authoritative storage for products.
#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Product, RepoError>;

    async fn list_all(&self) -> Result<Vec<Product>, RepoError>;

    async fn list_paged(&self, window: PageWindow) -> Result<Vec<Product>, RepoError>;

    /// Persist a new product and return the identifier assigned by the store.
    async fn insert(&self, product: &NewProduct) -> Result<i64, RepoError>;

    /// Overwrite a product and return its state from before the update.
    async fn update_by_id(&self, id: i64, product: &NewProduct) -> Result<Product, RepoError>;

    /// Remove a product and return the removed row.
    async fn delete_by_id(&self, id: i64) -> Result<Product, RepoError>;

    /// Count and remove every product as one atomic unit.
    async fn delete_all_returning_count(&self) -> Result<u64, RepoError>;

    /// Round-trip to the store to confirm it is reachable.
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}
