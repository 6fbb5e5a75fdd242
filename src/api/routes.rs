use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Suggestions
        .route("/suggest/:user_id", get(handlers::suggest))
        // Wardrobe
        .route(
            "/wardrobe/:user_id",
            get(handlers::get_wardrobe).post(handlers::add_item),
        )
        .route("/wardrobe/:user_id/:item_id", delete(handlers::delete_item))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        // Outermost, so the trace span already sees the request id
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
