use std::sync::Arc;
use std::time::Duration;

use crate::application::context::CallContext;
use crate::application::products::ProductService;

#[derive(Clone)]
pub struct ApiState {
    pub products: Arc<ProductService>,
    pub request_timeout: Option<Duration>,
}

impl ApiState {
    pub fn new(products: Arc<ProductService>, request_timeout: Option<Duration>) -> Self {
        Self {
            products,
            request_timeout,
        }
    }

    /// Call context for one request, bounded by the configured timeout.
    pub fn call_context(&self, request_id: &str) -> CallContext {
        let ctx = CallContext::new(request_id);
        match self.request_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }
}
