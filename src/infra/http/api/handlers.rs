use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::application::error::ErrorReport;
use crate::application::outcome::Served;
use crate::application::pagination::{PageWindow, PaginationError};
use crate::domain::products::NewProduct;
use crate::infra::http::middleware::RequestContext;

use super::error::ApiError;
use super::models::{CreatedResponse, DeletedRowsResponse, ProductListQuery};
use super::state::ApiState;

const SOURCE: &str = "infra::http::api::handlers";

pub async fn list_products(
    State(state): State<ApiState>,
    Extension(request): Extension<RequestContext>,
    Query(query): Query<ProductListQuery>,
) -> Result<Response, ApiError> {
    let window = page_window(&query)?;
    let ctx = state.call_context(&request.request_id);

    let served = match window {
        Some(window) => state.products.list_paged(&ctx, window).await,
        None => state.products.list_all(&ctx).await,
    }
    .map_err(|err| ApiError::from_service(SOURCE, &err, false))?;

    Ok(respond(StatusCode::OK, served.map(Json)))
}

pub async fn create_product(
    State(state): State<ApiState>,
    Extension(request): Extension<RequestContext>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let product = parse_body(&body)?;
    let ctx = state.call_context(&request.request_id);

    let served = state
        .products
        .create(&ctx, product)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, &err, false))?;

    Ok(respond(
        StatusCode::CREATED,
        served.map(|id| Json(CreatedResponse { id })),
    ))
}

pub async fn get_product(
    State(state): State<ApiState>,
    Extension(request): Extension<RequestContext>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw_id)?;
    let ctx = state.call_context(&request.request_id);

    let served = state
        .products
        .fetch_by_id(&ctx, id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, &err, true))?;

    // Already JSON, straight from the cache or the service encoder.
    Ok(respond(
        StatusCode::OK,
        served.map(|bytes| ([(header::CONTENT_TYPE, "application/json")], bytes)),
    ))
}

pub async fn update_product(
    State(state): State<ApiState>,
    Extension(request): Extension<RequestContext>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw_id)?;
    let product = parse_body(&body)?;
    let ctx = state.call_context(&request.request_id);

    let served = state
        .products
        .update_by_id(&ctx, id, product)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, &err, true))?;

    Ok(respond(StatusCode::OK, served.map(Json)))
}

pub async fn delete_product(
    State(state): State<ApiState>,
    Extension(request): Extension<RequestContext>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw_id)?;
    let ctx = state.call_context(&request.request_id);

    let served = state
        .products
        .delete_by_id(&ctx, id)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, &err, true))?;

    Ok(respond(StatusCode::OK, served.map(Json)))
}

pub async fn delete_all_products(
    State(state): State<ApiState>,
    Extension(request): Extension<RequestContext>,
) -> Result<Response, ApiError> {
    let ctx = state.call_context(&request.request_id);

    let served = state
        .products
        .delete_all(&ctx)
        .await
        .map_err(|err| ApiError::from_service(SOURCE, &err, false))?;

    Ok(respond(
        StatusCode::OK,
        served.map(|deleted_rows| Json(DeletedRowsResponse { deleted_rows })),
    ))
}

/// Build the success response, attaching non-critical faults for the logger.
fn respond<T: IntoResponse>(status: StatusCode, served: Served<T>) -> Response {
    let report = served.report();
    let mut response = (status, served.into_value()).into_response();
    if let Some(report) = report {
        ErrorReport::from_service_error(SOURCE, status, &report).attach(&mut response);
    }
    response
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    let id = parse_param("product id", raw)?;
    if id < 1 {
        return Err(ApiError::invalid_param(
            "product id",
            format!("invalid product id: has value {id}, must be ge 1"),
        ));
    }
    Ok(id)
}

/// Pagination applies only when both parameters are supplied.
fn page_window(query: &ProductListQuery) -> Result<Option<PageWindow>, ApiError> {
    let present = |value: &Option<String>| value.clone().filter(|value| !value.is_empty());
    let (Some(limit), Some(offset)) = (present(&query.limit), present(&query.offset)) else {
        return Ok(None);
    };

    let limit = parse_param("limit", &limit)?;
    let offset = parse_param("offset", &offset)?;

    PageWindow::new(limit, offset)
        .map(Some)
        .map_err(|err| match err {
            PaginationError::Limit(_) => ApiError::invalid_param("limit", err.to_string()),
            PaginationError::Offset(_) => ApiError::invalid_param("offset", err.to_string()),
        })
}

fn parse_param(name: &'static str, raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|err| ApiError::invalid_param(name, format!("failed to parse {name}: {err}")))
}

fn parse_body(body: &[u8]) -> Result<NewProduct, ApiError> {
    let product: NewProduct = serde_json::from_slice(body)
        .map_err(|err| ApiError::invalid_body(format!("failed to decode payload: {err}")))?;
    product
        .validate()
        .map_err(|err| ApiError::invalid_body(format!("failed to decode payload: {err}")))?;
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<&str>, offset: Option<&str>) -> ProductListQuery {
        ProductListQuery {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
        }
    }

    #[test]
    fn partial_pagination_lists_everything() {
        assert_eq!(page_window(&query(Some("5"), None)).unwrap(), None);
        assert_eq!(page_window(&query(None, Some("0"))).unwrap(), None);
        assert_eq!(page_window(&query(Some(""), Some("1"))).unwrap(), None);
    }

    #[test]
    fn full_pagination_builds_window() {
        let window = page_window(&query(Some("5"), Some("10")))
            .unwrap()
            .expect("window");
        assert_eq!(window.limit(), 5);
        assert_eq!(window.offset(), 10);
    }

    #[test]
    fn bad_pagination_values_are_rejected() {
        assert!(page_window(&query(Some("x"), Some("0"))).is_err());
        assert!(page_window(&query(Some("0"), Some("0"))).is_err());
        assert!(page_window(&query(Some("1"), Some("-1"))).is_err());
    }

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("7").unwrap(), 7);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-3").is_err());
        assert!(parse_id("abc").is_err());
    }

    #[test]
    fn body_requires_known_non_empty_fields() {
        assert!(parse_body(br#"{"name":"A","additionalInfo":"B"}"#).is_ok());
        assert!(parse_body(br#"{"name":"","additionalInfo":"B"}"#).is_err());
        assert!(parse_body(br#"{"name":"A","additionalInfo":"B","extra":1}"#).is_err());
        assert!(parse_body(b"not json").is_err());
    }
}
