//! Relay failures and their mapping to caller-visible responses.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that end a single relayed request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The caller's body could not be read.
    #[error("error reading inbound request body: {0}")]
    InboundRead(#[source] axum::Error),

    /// The outbound request could not be constructed.
    #[error("error building request to target: {0}")]
    OutboundBuild(#[source] axum::http::Error),

    /// The upstream could not be reached.
    #[error("error connecting to target server: {0}")]
    UpstreamConnect(#[source] hyper_util::client::legacy::Error),

    /// The upstream exchange ran past its deadline.
    #[error("target server did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    /// The upstream response body could not be read.
    #[error("error reading response from target server: {0}")]
    UpstreamRead(#[source] axum::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InboundRead(_) | RelayError::OutboundBuild(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::UpstreamConnect(_) | RelayError::UpstreamRead(_) => StatusCode::BAD_GATEWAY,
            RelayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
