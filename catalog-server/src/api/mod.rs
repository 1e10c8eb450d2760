//! API routes for catalog-server

pub mod health;
pub mod product;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the router
pub fn create_router(state: AppState) -> Router {
    let products = Router::new()
        .route("/api/products", post(product::create_product))
        .route("/api/products/{id}", get(product::get_product))
        .route(
            "/api/products/{id}/attributes",
            post(product::add_attribute).put(product::update_attributes),
        )
        .route(
            "/api/products/{id}/attributes/delete",
            post(product::delete_attributes),
        )
        .route(
            "/api/products/{id}/attributes/{attr_id}/values",
            post(product::add_attribute_values),
        )
        .route(
            "/api/products/{id}/attribute-values/delete",
            post(product::delete_attribute_values),
        )
        .route("/api/products/{id}/variants", put(product::update_variants))
        .route(
            "/api/products/{id}/variants/delete",
            post(product::delete_variants),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(products)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
