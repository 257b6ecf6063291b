use axum::routing::get;
use axum::Router;

use super::handlers;

/// Create the axum router with all routes.
pub fn create_router() -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/download", get(handlers::download))
        .route("/status", get(handlers::status))
}
