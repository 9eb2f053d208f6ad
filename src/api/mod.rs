//! API handlers for the circulation REST endpoints

pub mod health;
pub mod holders;
pub mod items;
pub mod loans;
pub mod openapi;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Items
        .route("/items/:id", get(items::get_item))
        // Holders
        .route(
            "/holders/:id",
            get(holders::get_holder).delete(holders::delete_holder),
        )
        // Loans
        .route("/holders/:id/borrow", post(loans::borrow))
        .route("/holders/:id/return", post(loans::return_items))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
