use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ErrorReport;
use crate::application::outcome::{Fault, ServiceError};

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
pub const INVALID_REQUEST_BODY: &str = "Invalid request body";

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Public JSON error plus the diagnostics handed to the logging middleware.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    report: ErrorReport,
}

impl ApiError {
    /// Malformed or out-of-range path or query parameter.
    pub fn invalid_param(name: &'static str, detail: impl Into<String>) -> Self {
        Self::client(StatusCode::BAD_REQUEST, format!("Invalid {name}"), detail)
    }

    pub fn invalid_body(detail: impl Into<String>) -> Self {
        Self::client(StatusCode::BAD_REQUEST, INVALID_REQUEST_BODY, detail)
    }

    /// Map a failed service call. `not_found_is_404` is false for routes that
    /// do not address a single product.
    pub fn from_service(
        source: &'static str,
        error: &ServiceError,
        not_found_is_404: bool,
    ) -> Self {
        let (status, message) = if not_found_is_404 && error.is_not_found() {
            (StatusCode::NOT_FOUND, PRODUCT_NOT_FOUND)
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
        };
        Self {
            status,
            message: message.to_string(),
            report: ErrorReport::from_service_error(source, status, error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn client(status: StatusCode, message: impl Into<String>, detail: impl Into<String>) -> Self {
        let rejected = ServiceError::critical(Fault::invalid_input(detail), Vec::new());
        Self {
            status,
            message: message.into(),
            report: ErrorReport::from_service_error("infra::http::api", status, &rejected),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.message,
        };
        let mut response = (self.status, Json(body)).into_response();
        self.report.attach(&mut response);
        response
    }
}
