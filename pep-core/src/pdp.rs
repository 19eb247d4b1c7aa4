//! HTTP client for the policy decision point

use crate::config::PepConfig;
use crate::decision::{Decision, PdpResponse};
use crate::error::{PepError, Result};
use crate::query::AuthorizationQuery;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, warn};

/// Path of the decision endpoint on the PDP
pub const IS_AUTHORIZED_PATH: &str = "/v1/is_authorized";

/// Client for `POST /v1/is_authorized`
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct PdpClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PdpClient {
    /// Create a client for the PDP at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PepError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), IS_AUTHORIZED_PATH),
        })
    }

    /// Create a client from service configuration
    pub fn from_config(config: &PepConfig) -> Result<Self> {
        Self::new(&config.pdp_url, config.pdp_timeout())
    }

    /// Full URL of the decision endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask the PDP whether `query` is authorized
    pub async fn is_authorized(&self, query: &AuthorizationQuery) -> Result<Decision> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(query)
            .send()
            .await
            .map_err(PepError::PdpUnavailable)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), endpoint = %self.endpoint, "PDP returned an error status");
            return Err(PepError::PdpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(PepError::PdpUnavailable)?;
        let decision = PdpResponse::from_slice(&body)?.decision()?;

        debug!(
            principal = %query.principal,
            action = %query.action,
            resource = %query.resource,
            decision = decision.as_str(),
            "PDP decision"
        );

        Ok(decision)
    }
}
