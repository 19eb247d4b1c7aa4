//! PEP HTTP Server - article routes behind a remote policy decision point
//!
//! Every article route passes through [`middleware::authorize`], which asks
//! the configured PDP for a verdict before the handler runs.

pub mod api;
pub mod app;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod state;
pub mod tracing;

pub use api::{ArticleList, HealthResponse, HealthStatus};
pub use app::app;
pub use error::ApiError;
pub use state::AppState;
