//! API route definitions

use super::guest_handlers;
use super::handlers::{self, GatewayState};
use axum::{routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: GatewayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Guest sign-in
        .route("/api/auth/guest", get(guest_handlers::guest_sign_in))
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
