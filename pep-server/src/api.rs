//! API response types

use serde::{Deserialize, Serialize};

/// Fixed catalogue returned by `GET /article`
pub const ARTICLES: [&str; 3] = ["article1", "article2", "article3"];

/// Response of `GET /article`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleList {
    /// Article names
    pub articles: Vec<String>,
}

impl Default for ArticleList {
    fn default() -> Self {
        Self {
            articles: ARTICLES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status
    pub status: HealthStatus,

    /// Service version
    pub version: String,

    /// Uptime in seconds
    pub uptime_seconds: u64,

    /// Decision endpoint the gate consults
    pub pdp_endpoint: String,
}

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is healthy
    Healthy,
}
