//! PEP Core - authorization queries and the policy decision point client
//!
//! This crate turns an inbound HTTP request's attributes into a Cedar-style
//! authorization query and asks a remote PDP for a verdict.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod decision;
pub mod error;
pub mod pdp;
pub mod query;

pub use config::{PdpFailureMode, PepConfig};
pub use decision::{Decision, PdpResponse};
pub use error::{PepError, Result};
pub use pdp::PdpClient;
pub use query::{first_path_segment, AuthorizationQuery, EntityUid, QueryBuilder};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
