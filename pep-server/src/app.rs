//! Router assembly

use crate::handlers;
use crate::middleware::authorize;
use crate::state::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Article routes, each gated by the PDP
pub fn article_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/article", get(handlers::list_articles))
        .route(
            "/article/:id",
            post(handlers::create_article)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .route_layer(from_fn_with_state(state, authorize))
}

/// The full application: gated article routes plus ungated operational routes
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(article_routes(state.clone()))
        .route("/health/live", get(handlers::health_live))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
