//! Header filtering between the two connection legs.
//!
//! # Design Decisions
//! - Comparison is case-insensitive (`HeaderName` is always lowercase)
//! - Multi-value headers are appended, never collapsed
//! - Framing headers are recomputed by the transport, never relayed

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Upstream response headers never relayed to the caller.
pub static EXCLUDED_RESPONSE_HEADERS: [HeaderName; 4] = [
    header::CONTENT_ENCODING,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

/// Inbound request headers never copied upstream.
///
/// `Host` is supplied by the client for the target. `Transfer-Encoding`
/// describes the inbound framing of a body that is already fully buffered.
pub static EXCLUDED_REQUEST_HEADERS: [HeaderName; 2] = [header::HOST, header::TRANSFER_ENCODING];

/// Headers for the outbound request.
///
/// `Content-Length` is set to `body_len` whenever the body is non-empty,
/// replacing whatever the caller sent.
pub fn forward_request_headers(inbound: &HeaderMap, body_len: usize) -> HeaderMap {
    let mut outbound = copy_except(inbound, &EXCLUDED_REQUEST_HEADERS);
    if body_len > 0 {
        outbound.insert(header::CONTENT_LENGTH, HeaderValue::from(body_len));
    }
    outbound
}

/// Headers relayed back to the caller.
pub fn relay_response_headers(upstream: &HeaderMap) -> HeaderMap {
    copy_except(upstream, &EXCLUDED_RESPONSE_HEADERS)
}

fn copy_except(source: &HeaderMap, excluded: &[HeaderName]) -> HeaderMap {
    let mut target = HeaderMap::with_capacity(source.len());
    for (name, value) in source {
        if !excluded.contains(name) {
            target.append(name.clone(), value.clone());
        }
    }
    target
}

/// Cookie pairs carried by the `Cookie` header(s), in order.
pub fn cookies(headers: &HeaderMap) -> Vec<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect()
}
