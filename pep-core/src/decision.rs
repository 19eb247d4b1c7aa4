//! Authorization decisions returned by the PDP

use crate::error::{PepError, Result};
use serde::{Deserialize, Serialize};

/// The only verdict string that grants access
pub const ALLOW_VERDICT: &str = "Allow";

/// Authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Request is permitted
    Allow,
    /// Request is denied
    Deny,
}

impl Decision {
    /// Interpret a PDP verdict. Only the exact string `"Allow"` permits.
    pub fn from_verdict(verdict: &str) -> Self {
        if verdict == ALLOW_VERDICT {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    /// Whether the request may proceed
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }

    /// Lower-case label for logs and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
        }
    }
}

/// Response body of `POST /v1/is_authorized`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PdpResponse {
    /// Verdict string, `"Allow"` or anything else
    #[serde(default)]
    pub decision: Option<String>,

    /// Evaluation details, when the PDP returns them
    #[serde(default)]
    pub diagnostics: Option<serde_json::Value>,
}

impl PdpResponse {
    /// Parse a raw response body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| PepError::InvalidResponse(e.to_string()))
    }

    /// Resolve the verdict into a [`Decision`]
    pub fn decision(&self) -> Result<Decision> {
        self.decision
            .as_deref()
            .map(Decision::from_verdict)
            .ok_or(PepError::MissingDecision)
    }
}
