//! Authorization layer in front of every article route
//!
//! Each request is turned into an [`AuthorizationQuery`] and sent to the PDP.
//! Only an `Allow` verdict reaches the wrapped handler; a denial is answered
//! with 403 `Access Denied`.

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;
use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{OriginalUri, Request, State},
    http::{header::CONTENT_LENGTH, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use pep_core::{AuthorizationQuery, Decision, PdpFailureMode, QueryBuilder};
use std::error::Error as _;
use std::time::Instant;
use tracing::{info, warn, Instrument};

/// Header carrying the caller identity
pub const USER_HEADER: &str = "user";

/// Body of every denial
pub const ACCESS_DENIED: &str = "Access Denied";

/// The fixed denial response
pub fn access_denied() -> Response {
    (StatusCode::FORBIDDEN, ACCESS_DENIED).into_response()
}

/// Gate a request on the PDP's verdict
pub async fn authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match read_body(&parts, body, state.config.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => return e.into_response(),
    };

    let query = match build_query(&parts, &bytes) {
        Ok(query) => query,
        Err(e) => return e.into_response(),
    };

    let span = crate::tracing::create_authorization_span(
        &query.principal.to_string(),
        &query.action.to_string(),
        &query.resource.to_string(),
    );

    async move {
        let start = Instant::now();
        let outcome = state.pdp.is_authorized(&query).await;
        let elapsed = start.elapsed().as_secs_f64();
        metrics::record_pdp_latency(elapsed);

        match outcome {
            Ok(Decision::Allow) => {
                crate::tracing::record_decision(Decision::Allow.as_str(), elapsed * 1000.0);
                metrics::record_authorization(Decision::Allow.as_str());
                info!("Access granted");
                next.run(Request::from_parts(parts, Body::from(bytes))).await
            }
            Ok(Decision::Deny) => {
                crate::tracing::record_decision(Decision::Deny.as_str(), elapsed * 1000.0);
                metrics::record_authorization(Decision::Deny.as_str());
                info!("Access denied");
                access_denied()
            }
            Err(e) => {
                crate::tracing::record_error(&e.to_string());
                metrics::record_pdp_error(e.kind());
                warn!(error = %e, mode = ?state.config.failure_mode, "PDP call failed");

                match state.config.failure_mode {
                    PdpFailureMode::Deny => {
                        metrics::record_authorization(Decision::Deny.as_str());
                        access_denied()
                    }
                    PdpFailureMode::Error => ApiError::from(e).into_response(),
                }
            }
        }
    }
    .instrument(span)
    .await
}

/// Buffer the request body, refusing anything over `limit` bytes
async fn read_body(parts: &Parts, body: Body, limit: usize) -> Result<Bytes, ApiError> {
    let declared = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(ApiError::PayloadTooLarge(limit));
    }

    to_bytes(body, limit).await.map_err(|e| {
        if exceeds_limit(&e) {
            ApiError::PayloadTooLarge(limit)
        } else {
            ApiError::BadRequest(format!("Failed to read request body: {}", e))
        }
    })
}

/// Whether a body read failed because the stream ran past its limit
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut cause = err.source();
    while let Some(e) = cause {
        if e.is::<LengthLimitError>() {
            return true;
        }
        cause = e.source();
    }
    false
}

/// Parse a request body into the query context; an empty body is `null`.
///
/// Key order and number literals survive as written.
pub fn parse_context(bytes: &[u8]) -> Result<serde_json::Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}

fn build_query(parts: &Parts, bytes: &[u8]) -> Result<AuthorizationQuery, ApiError> {
    let principal = parts
        .headers
        .get(USER_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default();

    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.0.path())
        .unwrap_or_else(|| parts.uri.path());

    Ok(QueryBuilder::new()
        .principal(&principal)
        .method(parts.method.as_str())
        .path(path)
        .context(parse_context(bytes)?)
        .build()?)
}
