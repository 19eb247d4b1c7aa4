//! Service configuration
//!
//! Settings come from an optional TOML file named by `PEP_CONFIG`, with
//! environment variables layered on top.

use crate::error::{PepError, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default listening port
pub const DEFAULT_PORT: u16 = 3001;
/// Default PDP location
pub const DEFAULT_PDP_URL: &str = "http://host.docker.internal:8180";
/// Default PDP timeout in milliseconds
pub const DEFAULT_PDP_TIMEOUT_MS: u64 = 5_000;
/// Default request body limit
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// What the gate does when the PDP cannot produce a decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdpFailureMode {
    /// Treat the failure as a denial (403)
    #[default]
    Deny,
    /// Surface the failure as 503 Service Unavailable
    Error,
}

impl FromStr for PdpFailureMode {
    type Err = PepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deny" | "closed" => Ok(PdpFailureMode::Deny),
            "error" => Ok(PdpFailureMode::Error),
            other => Err(PepError::Config(format!(
                "Unknown PDP failure mode '{}' (expected 'deny' or 'error')",
                other
            ))),
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PepConfig {
    /// Listening host
    pub host: IpAddr,
    /// Listening port
    pub port: u16,
    /// Base URL of the policy decision point
    pub pdp_url: String,
    /// Timeout for one PDP call, in milliseconds
    pub pdp_timeout_ms: u64,
    /// Behavior when the PDP fails
    pub failure_mode: PdpFailureMode,
    /// Largest request body the gate will buffer
    pub max_body_bytes: usize,
}

impl Default for PepConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            pdp_url: DEFAULT_PDP_URL.to_string(),
            pdp_timeout_ms: DEFAULT_PDP_TIMEOUT_MS,
            failure_mode: PdpFailureMode::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl PepConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("PEP_CONFIG") {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(host) = lookup("HOST") {
            config.host = parse_var("HOST", &host)?;
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse_var("PORT", &port)?;
        }
        if let Some(url) = lookup("PDP_URL") {
            config.pdp_url = url;
        }
        if let Some(timeout) = lookup("PDP_TIMEOUT_MS") {
            config.pdp_timeout_ms = parse_var("PDP_TIMEOUT_MS", &timeout)?;
        }
        if let Some(mode) = lookup("PDP_FAILURE_MODE") {
            config.failure_mode = mode.parse()?;
        }
        if let Some(limit) = lookup("MAX_BODY_BYTES") {
            config.max_body_bytes = parse_var("MAX_BODY_BYTES", &limit)?;
        }

        config.validate()?;
        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&text).map_err(|e| {
            PepError::Config(format!("{}: {}", path.as_ref().display(), e))
        })
    }

    /// Socket address to listen on
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// PDP timeout as a [`Duration`]
    pub fn pdp_timeout(&self) -> Duration {
        Duration::from_millis(self.pdp_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if !(self.pdp_url.starts_with("http://") || self.pdp_url.starts_with("https://")) {
            return Err(PepError::Config(format!(
                "PDP_URL must be an http(s) URL, got '{}'",
                self.pdp_url
            )));
        }
        if self.pdp_timeout_ms == 0 {
            return Err(PepError::Config("PDP_TIMEOUT_MS must be positive".into()));
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| PepError::Config(format!("Invalid {} '{}': {}", name, value, e)))
}
