//! Error-to-response mapping.
//!
//! # Responsibilities
//! - Map dispatch failures to HTTP status codes
//! - Render a JSON error body, with details only in debug mode
//!
//! # Design Decisions
//! - A broken not-found route is a server error, never a 404
//! - Error messages are logged in full regardless of mode

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::dispatch::{ControllerError, DispatchError};
use crate::routing::error::RoutingError;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// Status code for a dispatch failure.
pub fn status_for(error: &DispatchError) -> StatusCode {
    match error {
        DispatchError::Controller(ControllerError::NotFound(_)) => StatusCode::NOT_IMPLEMENTED,
        DispatchError::Routing(RoutingError::InvalidParameter { .. })
        | DispatchError::Routing(RoutingError::MissingParameter { .. }) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render a dispatch failure.
pub fn error_response(error: &DispatchError, debug: bool) -> Response {
    let status = status_for(error);
    let body = ErrorBody {
        error: status.canonical_reason().unwrap_or("Error"),
        detail: debug.then(|| error.to_string()),
    };
    (status, Json(body)).into_response()
}
