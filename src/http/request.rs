//! Request identification and context extraction.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Derive the routing context (method, host) from the incoming request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `X-Request-ID` is kept as is

use axum::http::{header, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::config::ContextConfig;
use crate::routing::context::RequestContext;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Produces a fresh UUID v4 for requests lacking an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID set by the request-id layer.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Build the routing context for one request.
///
/// Scheme, ports and base path come from configuration; method and host
/// from the request. The port part of the `Host` header is dropped.
pub fn request_context<B>(request: &Request<B>, defaults: &ContextConfig) -> RequestContext {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().host())
        .map(strip_port)
        .filter(|h| !h.is_empty())
        .unwrap_or(defaults.host.as_str());

    defaults
        .to_context()
        .with_method(request.method().as_str())
        .with_host(host)
}

fn strip_port(host: &str) -> &str {
    // Bracketed IPv6 literal
    if let Some(end) = host.find(']') {
        return &host[..=end];
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}
