use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{documents, handlers, session};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config().server.max_request_bytes;

    // Routes behind caller authentication
    let protected = Router::new()
        .route("/config", get(handlers::get_config))
        .route("/auth/login", post(session::login))
        .route("/documents", post(documents::upload))
        .route("/documents/base64", post(documents::upload_base64))
        .route("/documents/batch", post(documents::upload_batch))
        .route("/documents/list", post(documents::list))
        .route("/documents/search", post(documents::search))
        .route("/documents/{id}", get(documents::download))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
