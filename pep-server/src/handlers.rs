//! HTTP request handlers
//!
//! Article handlers run only after the authorization layer has allowed the
//! request; none of them touch storage.

use crate::api::{ArticleList, HealthResponse, HealthStatus};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

/// `GET /article`
pub async fn list_articles() -> Json<ArticleList> {
    Json(ArticleList::default())
}

/// `POST /article/:id`
pub async fn create_article(Path(id): Path<String>) -> &'static str {
    debug!(%id, "Create article");
    "Article created"
}

/// `PUT /article/:id`
pub async fn update_article(Path(id): Path<String>) -> &'static str {
    debug!(%id, "Update article");
    "Article updated"
}

/// `DELETE /article/:id`
pub async fn delete_article(Path(id): Path<String>) -> &'static str {
    debug!(%id, "Delete article");
    "Article deleted"
}

/// Health check - liveness probe
pub async fn health_live(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        pdp_endpoint: state.pdp.endpoint().to_string(),
    })
}

/// Prometheus metrics endpoint
pub async fn metrics() -> String {
    crate::metrics::get_prometheus_metrics()
}
