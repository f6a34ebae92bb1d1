//! Traffic observation hooks.
//!
//! The pipeline calls an observer at four points: request received, request
//! forwarded, response received and conversion outcome. Hooks return nothing
//! and cannot influence the relay.

use std::fmt::Write;

use axum::http::{HeaderMap, Method, StatusCode, Uri};

use crate::security::headers::cookies;
use crate::transform::{Outcome, TransformError};

/// Borrowed view of a request at one point in the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct MessageView<'a> {
    pub method: &'a Method,
    pub uri: &'a Uri,
    pub headers: &'a HeaderMap,
    pub body: &'a [u8],
}

/// Sink for traffic events.
pub trait RelayObserver: Send + Sync {
    fn request_received(&self, _request: &MessageView<'_>) {}

    fn request_forwarded(&self, _request: &MessageView<'_>) {}

    fn response_received(&self, _status: StatusCode, _headers: &HeaderMap, _body: &[u8]) {}

    fn conversion(&self, _outcome: &Outcome) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RelayObserver for NoopObserver {}

/// Emits every event as a structured `tracing` record.
///
/// Full messages go out at INFO; set `log_traffic = false` to swap in
/// [`NoopObserver`] instead of filtering here.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RelayObserver for TracingObserver {
    fn request_received(&self, request: &MessageView<'_>) {
        tracing::info!(
            method = %request.method,
            url = %request.uri,
            headers = %render_headers(request.headers),
            cookies = ?cookies(request.headers),
            body = %render_body(request.body),
            "Inbound request"
        );
    }

    fn request_forwarded(&self, request: &MessageView<'_>) {
        tracing::info!(
            method = %request.method,
            url = %request.uri,
            headers = %render_headers(request.headers),
            body = %render_body(request.body),
            "Request forwarded to target"
        );
    }

    fn response_received(&self, status: StatusCode, headers: &HeaderMap, body: &[u8]) {
        tracing::info!(
            status = %status,
            headers = %render_headers(headers),
            body = %render_body(body),
            "Response from target"
        );
    }

    fn conversion(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Unchanged => tracing::debug!("No precise_amount string to convert"),
            Outcome::Converted { original, value } => tracing::info!(
                original = %original,
                value = %value,
                "Converted precise_amount from string to number"
            ),
            Outcome::Failed(TransformError::InvalidPreciseAmount { original }) => tracing::warn!(
                original = %original,
                "Could not convert precise_amount, forwarding body unchanged"
            ),
            Outcome::Failed(e) => tracing::warn!(
                error = %e,
                "Could not process JSON body, forwarding body unchanged"
            ),
        }
    }
}

/// `name: v1, v2; other: v` with one entry per distinct name.
fn render_headers(headers: &HeaderMap) -> String {
    let mut out = String::new();
    for name in headers.keys() {
        if !out.is_empty() {
            out.push_str("; ");
        }
        let values: Vec<_> = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
            .collect();
        let _ = write!(out, "{}: {}", name, values.join(", "));
    }
    out
}

fn render_body(body: &[u8]) -> std::borrow::Cow<'_, str> {
    if body.is_empty() {
        "<empty>".into()
    } else {
        String::from_utf8_lossy(body)
    }
}
