pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};
pub use middleware::RequestContext;

use axum::{
    Router,
    extract::{Extension, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::application::error::ErrorReport;

use middleware::{log_responses, set_request_context};

/// Full HTTP surface: product routes, health probe and the request middleware.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(build_api_router())
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn health(
    State(state): State<ApiState>,
    Extension(request): Extension<RequestContext>,
) -> Response {
    let ctx = state.call_context(&request.request_id);
    match state.products.ping(&ctx).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_service_error(
                "infra::http::health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
