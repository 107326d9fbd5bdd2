use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::{application::outcome::ServiceError, infra::error::InfraError};

/// Diagnostics attached to a response for the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    /// One message per fault, non-critical faults first.
    pub fn from_service_error(
        source: &'static str,
        status: StatusCode,
        error: &ServiceError,
    ) -> Self {
        Self {
            source,
            status,
            messages: error.messages(),
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Process-level failure reported by the binary before exiting.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
