//! Per-call context handed down from the request boundary.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};

/// Request-scoped values that every backend call observes.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    request_id: String,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            deadline: None,
        }
    }

    /// Context with no request id and no deadline, for startup tasks and tests.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Drive a backend call under the deadline; an elapsed deadline becomes `on_elapsed()`.
    pub async fn run<T, E, F>(&self, call: F, on_elapsed: impl FnOnce() -> E) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        match self.deadline {
            Some(deadline) => match timeout_at(deadline, call).await {
                Ok(result) => result,
                Err(_) => Err(on_elapsed()),
            },
            None => call.await,
        }
    }
}
