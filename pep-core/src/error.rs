//! Error types for the enforcement point

use thiserror::Error;

/// Main error type for PEP operations
#[derive(Error, Debug)]
pub enum PepError {
    /// The authorization query could not be built
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The PDP could not be reached or did not answer in time
    #[error("Policy decision point unavailable: {0}")]
    PdpUnavailable(#[source] reqwest::Error),

    /// The PDP answered with a non-success status
    #[error("Policy decision point returned HTTP {status}")]
    PdpStatus {
        /// Status code returned by the PDP
        status: u16,
    },

    /// The PDP answered with a body that is not a decision document
    #[error("Invalid PDP response: {0}")]
    InvalidResponse(String),

    /// The PDP response carried no `decision` field
    #[error("PDP response is missing the decision field")]
    MissingDecision,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PepError {
    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            PepError::InvalidQuery(_) => "invalid_query",
            PepError::PdpUnavailable(_) => "pdp_unavailable",
            PepError::PdpStatus { .. } => "pdp_status",
            PepError::InvalidResponse(_) => "invalid_response",
            PepError::MissingDecision => "missing_decision",
            PepError::Config(_) => "config",
            PepError::Io(_) => "io",
        }
    }

    /// Whether the error came from talking to the PDP
    pub fn is_pdp_failure(&self) -> bool {
        matches!(
            self,
            PepError::PdpUnavailable(_)
                | PepError::PdpStatus { .. }
                | PepError::InvalidResponse(_)
                | PepError::MissingDecision
        )
    }
}

/// Result type alias for PEP operations
pub type Result<T> = std::result::Result<T, PepError>;
