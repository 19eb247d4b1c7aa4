//! Application state

use pep_core::{PdpClient, PepConfig};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers and the authorization layer
#[derive(Clone)]
pub struct AppState {
    /// Client for the policy decision point
    pub pdp: PdpClient,

    /// Service configuration
    pub config: Arc<PepConfig>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(pdp: PdpClient, config: PepConfig) -> Self {
        Self {
            pdp,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Build the PDP client from `config` and wrap both
    pub fn from_config(config: PepConfig) -> pep_core::Result<Self> {
        let pdp = PdpClient::from_config(&config)?;
        Ok(Self::new(pdp, config))
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
