//! Response assembly for the caller.
//!
//! # Responsibilities
//! - Copy the upstream status verbatim (3xx included)
//! - Strip hop-by-hop and framing headers
//! - Attach the buffered upstream body
//!
//! # Design Decisions
//! - Bodies are buffered; the server recomputes framing for the caller
//! - Error responses are plain text (see `relay::error`)

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Response, StatusCode};

use crate::security::headers::relay_response_headers;

/// Build the caller's response from a buffered upstream response.
pub fn relay_response(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = relay_response_headers(headers);
    response
}
