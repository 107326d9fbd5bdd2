pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    routing::{get, post},
};

pub fn build_api_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/products",
            get(handlers::list_products).delete(handlers::delete_all_products),
        )
        .route("/product", post(handlers::create_product))
        .route(
            "/product/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}
