//! Product service coordinating the durable store and the volatile cache.
//!
//! Reads go cache-first and repopulate the cache from the store on a miss.
//! Creates write the store and then the cache. Updates and deletes invalidate
//! the cache entry before touching the store, and a bulk delete clears the
//! cache before truncating the store. Cache faults are non-critical except at
//! those invalidation points; store faults are always critical.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::application::cache::{CacheError, ProductCache};
use crate::application::context::CallContext;
use crate::application::outcome::{Fault, ServiceError, ServiceResult, Served};
use crate::application::pagination::PageWindow;
use crate::application::repos::{ProductsRepo, RepoError};
use crate::domain::products::{NewProduct, Product};

const SOURCE: &str = "products::service";

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductsRepo>,
    cache: Arc<dyn ProductCache>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductsRepo>, cache: Arc<dyn ProductCache>) -> Self {
        Self { store, cache }
    }

    /// Fetch the JSON encoding of a product, from the cache when possible.
    pub async fn fetch_by_id(&self, ctx: &CallContext, id: i64) -> ServiceResult<Bytes> {
        let mut degraded = Vec::new();

        match self.on_cache(ctx, self.cache.get(id)).await {
            Ok(cached) => {
                debug!(target: SOURCE, id, request_id = ctx.request_id(), "cache hit");
                return Ok(Served::clean(cached));
            }
            Err(CacheError::NotFound { .. }) => {
                debug!(target: SOURCE, id, request_id = ctx.request_id(), "cache miss");
            }
            Err(err) => {
                warn!(
                    target: SOURCE,
                    id,
                    request_id = ctx.request_id(),
                    error = %err,
                    "cache read failed, falling back to store"
                );
                degraded.push(Fault::from(err));
            }
        }

        let product = match self.on_store(ctx, self.store.find_by_id(id)).await {
            Ok(product) => product,
            Err(err) => return Err(ServiceError::critical(err, degraded)),
        };

        if let Err(err) = self.on_cache(ctx, self.cache.set(&product)).await {
            warn!(
                target: SOURCE,
                id,
                request_id = ctx.request_id(),
                error = %err,
                "cache repopulation failed"
            );
            degraded.push(Fault::from(err));
        }

        match serde_json::to_vec(&product) {
            Ok(encoded) => Ok(Served::with_warnings(Bytes::from(encoded), degraded)),
            Err(err) => Err(ServiceError::critical(Fault::encoding(err), degraded)),
        }
    }

    pub async fn list_all(&self, ctx: &CallContext) -> ServiceResult<Vec<Product>> {
        self.on_store(ctx, self.store.list_all())
            .await
            .map(Served::clean)
            .map_err(|err| ServiceError::critical(err, Vec::new()))
    }

    pub async fn list_paged(
        &self,
        ctx: &CallContext,
        window: PageWindow,
    ) -> ServiceResult<Vec<Product>> {
        self.on_store(ctx, self.store.list_paged(window))
            .await
            .map(Served::clean)
            .map_err(|err| ServiceError::critical(err, Vec::new()))
    }

    /// Store a new product and warm the cache with it. Returns the assigned id.
    pub async fn create(&self, ctx: &CallContext, product: NewProduct) -> ServiceResult<i64> {
        let id = self
            .on_store(ctx, self.store.insert(&product))
            .await
            .map_err(|err| ServiceError::critical(err, Vec::new()))?;

        let stored = Product::from_new(id, &product);
        match self.on_cache(ctx, self.cache.set(&stored)).await {
            Ok(()) => Ok(Served::clean(id)),
            Err(err) => {
                warn!(
                    target: SOURCE,
                    id,
                    request_id = ctx.request_id(),
                    error = %err,
                    "cache write after create failed"
                );
                Ok(Served::with_warnings(id, vec![Fault::from(err)]))
            }
        }
    }

    /// Replace a product and return its state from before the update.
    pub async fn update_by_id(
        &self,
        ctx: &CallContext,
        id: i64,
        product: NewProduct,
    ) -> ServiceResult<Product> {
        let degraded = self.invalidate(ctx, id).await?;

        match self
            .on_store(ctx, self.store.update_by_id(id, &product))
            .await
        {
            Ok(previous) => Ok(Served::with_warnings(previous, degraded)),
            Err(err) => Err(ServiceError::critical(err, degraded)),
        }
    }

    /// Remove a product and return the removed snapshot.
    pub async fn delete_by_id(&self, ctx: &CallContext, id: i64) -> ServiceResult<Product> {
        let degraded = self.invalidate(ctx, id).await?;

        match self.on_store(ctx, self.store.delete_by_id(id)).await {
            Ok(deleted) => Ok(Served::with_warnings(deleted, degraded)),
            Err(err) => Err(ServiceError::critical(err, degraded)),
        }
    }

    /// Clear the cache, then remove every stored product. Returns the removed row count.
    pub async fn delete_all(&self, ctx: &CallContext) -> ServiceResult<u64> {
        self.on_cache(ctx, self.cache.clear())
            .await
            .map_err(|err| ServiceError::critical(err, Vec::new()))?;

        self.on_store(ctx, self.store.delete_all_returning_count())
            .await
            .map(Served::clean)
            .map_err(|err| {
                warn!(
                    target: SOURCE,
                    request_id = ctx.request_id(),
                    error = %err,
                    "store purge failed after cache was cleared"
                );
                ServiceError::critical(err, Vec::new())
            })
    }

    /// Check that the durable store answers within the call deadline.
    pub async fn ping(&self, ctx: &CallContext) -> Result<(), ServiceError> {
        self.on_store(ctx, self.store.ping())
            .await
            .map_err(|err| ServiceError::critical(err, Vec::new()))
    }

    /// Drop the cached copy of `id`. A missing entry is demoted to a non-critical
    /// fault; any other cache failure aborts the calling operation.
    async fn invalidate(&self, ctx: &CallContext, id: i64) -> Result<Vec<Fault>, ServiceError> {
        match self.on_cache(ctx, self.cache.delete_by_id(id)).await {
            Ok(()) => Ok(Vec::new()),
            Err(err @ CacheError::NotFound { .. }) => Ok(vec![Fault::from(err)]),
            Err(err) => Err(ServiceError::critical(err, Vec::new())),
        }
    }

    async fn on_cache<T, F>(&self, ctx: &CallContext, call: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        ctx.run(call, || {
            CacheError::internal("cache call exceeded its deadline")
        })
        .await
    }

    async fn on_store<T, F>(&self, ctx: &CallContext, call: F) -> Result<T, RepoError>
    where
        F: Future<Output = Result<T, RepoError>>,
    {
        ctx.run(call, || RepoError::Timeout).await
    }
}
