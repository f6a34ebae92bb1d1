//! The relay pipeline: inbound request → upstream → caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, Response, Uri};
use axum::response::IntoResponse;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::UpstreamConfig;
use crate::http::response::relay_response;
use crate::observability::metrics;
use crate::relay::error::RelayError;
use crate::relay::observer::{MessageView, RelayObserver};
use crate::resilience::timeouts::{Deadline, TimedOut};
use crate::security::headers::forward_request_headers;
use crate::transform::convert_precise_amount;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Forwards every request to one fixed upstream.
///
/// Cheap to clone; clones share the client, target and observer.
#[derive(Clone)]
pub struct RelayPipeline {
    base_url: Arc<str>,
    timeout: Option<Duration>,
    client: Client<HttpConnector, Body>,
    observer: Arc<dyn RelayObserver>,
}

impl RelayPipeline {
    /// Create a pipeline for the configured upstream.
    pub fn new(upstream: &UpstreamConfig, observer: Arc<dyn RelayObserver>) -> Self {
        // The legacy client never follows redirects.
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            base_url: upstream.base_url().into(),
            timeout: upstream.timeout(),
            client,
            observer,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Relay one request. Failures become error responses for this caller.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let method = request.method().to_string();

        let response = match self.relay(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, status = %e.status(), "Relay failed");
                e.into_response()
            }
        };

        metrics::record_request(&method, response.status().as_u16(), start);
        response
    }

    async fn relay(&self, request: Request<Body>) -> Result<Response<Body>, RelayError> {
        let (parts, body) = request.into_parts();

        // 1. Buffer the inbound body
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(RelayError::InboundRead)?;

        self.observer.request_received(&MessageView {
            method: &parts.method,
            uri: &parts.uri,
            headers: &parts.headers,
            body: &body,
        });

        // 2. Rewrite precise_amount in JSON bodies
        let body = if is_json(&parts.headers) && !body.is_empty() {
            let transformed = convert_precise_amount(&body);
            self.observer.conversion(&transformed.outcome);
            metrics::record_conversion(&transformed.outcome);
            transformed.body
        } else {
            body
        };

        // 3. Build the outbound request
        let uri = self.target_uri(&parts.uri)?;
        let headers = forward_request_headers(&parts.headers, body.len());

        self.observer.request_forwarded(&MessageView {
            method: &parts.method,
            uri: &uri,
            headers: &headers,
            body: &body,
        });

        let mut outbound = Request::builder()
            .method(parts.method)
            .uri(uri)
            .body(Body::from(body))
            .map_err(RelayError::OutboundBuild)?;
        *outbound.headers_mut() = headers;

        // 4-6. Send and buffer the response under one deadline
        let deadline = Deadline::after(self.timeout);
        let timed_out = |_: TimedOut| RelayError::UpstreamTimeout(self.timeout.unwrap_or_default());

        let upstream = deadline
            .run(self.client.request(outbound))
            .await
            .map_err(timed_out)?
            .map_err(RelayError::UpstreamConnect)?;

        let (upstream_parts, upstream_body) = upstream.into_parts();
        let upstream_body = deadline
            .run(axum::body::to_bytes(Body::new(upstream_body), usize::MAX))
            .await
            .map_err(timed_out)?
            .map_err(RelayError::UpstreamRead)?;

        self.observer.response_received(
            upstream_parts.status,
            &upstream_parts.headers,
            &upstream_body,
        );

        // 7. Status verbatim, filtered headers, buffered body
        Ok(relay_response(
            upstream_parts.status,
            &upstream_parts.headers,
            upstream_body,
        ))
    }

    /// Base URL + inbound path + `?query` when the query is non-empty.
    fn target_uri(&self, inbound: &Uri) -> Result<Uri, RelayError> {
        let mut target = format!("{}{}", self.base_url, inbound.path());
        if let Some(query) = inbound.query().filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        Uri::try_from(target).map_err(|e| RelayError::OutboundBuild(e.into()))
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(JSON_CONTENT_TYPE))
}
