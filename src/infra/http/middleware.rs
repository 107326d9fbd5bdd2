use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

const TARGET: &str = "products::http::response";

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Log every request once it has been answered, together with any faults
/// collected while serving it.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        if status.is_server_error() {
            error!(
                target: TARGET,
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                elapsed_ms,
                request_id,
                "request failed without diagnostics",
            );
        } else {
            info!(
                target: TARGET,
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms,
                request_id,
                "request served",
            );
        }
        return response;
    };

    let faults = numbered(&report.messages);

    if status.is_server_error() {
        error!(
            target: TARGET,
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            query = uri.query().unwrap_or(""),
            elapsed_ms,
            source = report.source,
            faults = %faults,
            request_id,
            "request failed",
        );
    } else if status.is_client_error() {
        warn!(
            target: TARGET,
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            query = uri.query().unwrap_or(""),
            elapsed_ms,
            source = report.source,
            faults = %faults,
            request_id,
            "client request error",
        );
    } else {
        warn!(
            target: TARGET,
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            query = uri.query().unwrap_or(""),
            elapsed_ms,
            source = report.source,
            faults = %faults,
            request_id,
            "request degraded",
        );
    }

    response
}

fn numbered(messages: &[String]) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| format!("{}. {}", index + 1, message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_are_numbered_in_order() {
        let messages = vec![
            "internal cache error: timeout".to_string(),
            "product not found: failed to find product 2 in DB".to_string(),
        ];
        assert_eq!(
            numbered(&messages),
            "1. internal cache error: timeout; 2. product not found: failed to find product 2 in DB"
        );
    }
}
