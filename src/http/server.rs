//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all handler for every method and path
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Hand each request to the relay pipeline
//! - Stop accepting on shutdown and drain in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Instrument;

use crate::config::ProxyConfig;
use crate::http::request::{RequestIdExt, UuidRequestId};
use crate::relay::{NoopObserver, RelayObserver, RelayPipeline, TracingObserver};

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    relay: RelayPipeline,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Traffic is logged through [`TracingObserver`] unless
    /// `observability.log_traffic` is off.
    pub fn new(config: ProxyConfig) -> Self {
        let observer: Arc<dyn RelayObserver> = if config.observability.log_traffic {
            Arc::new(TracingObserver)
        } else {
            Arc::new(NoopObserver)
        };
        Self::with_observer(config, observer)
    }

    /// Create a server that reports traffic to `observer`.
    pub fn with_observer(config: ProxyConfig, observer: Arc<dyn RelayObserver>) -> Self {
        let relay = RelayPipeline::new(&config.upstream, observer);
        let router = Self::build_router(relay.clone());
        Self { router, relay }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(relay: RelayPipeline) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(relay)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            target = %self.relay.base_url(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router with middleware, for driving without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Catch-all handler: every request goes upstream.
async fn proxy_handler(
    State(relay): State<RelayPipeline>,
    request: Request<Body>,
) -> Response<Body> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let span = tracing::info_span!(
        "relay",
        request_id = %request.request_id().unwrap_or("unknown"),
        client = %client,
        method = %request.method(),
        path = %request.uri().path()
    );

    relay.handle(request).instrument(span).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::X_REQUEST_ID;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn unreachable_config() -> ProxyConfig {
        // Bind and release a port so nothing is listening on it.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let mut config = ProxyConfig::default();
        config.upstream.host = "127.0.0.1".into();
        config.upstream.port = port;
        config.observability.log_traffic = false;
        config
    }

    #[tokio::test]
    async fn any_method_and_path_reaches_the_relay() {
        for (method, path) in [("GET", "/"), ("DELETE", "/a/b/c"), ("PATCH", "/x?y=1")] {
            let router = HttpServer::new(unreachable_config()).into_router();
            let request = Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap();

            let response = router.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_GATEWAY, "{method} {path}");
        }
    }

    #[tokio::test]
    async fn request_id_is_generated_and_echoed() {
        let router = HttpServer::new(unreachable_config()).into_router();
        let response = router
            .oneshot(Request::new(Body::empty()))
            .await
            .unwrap();
        assert!(response.headers().get(X_REQUEST_ID).is_some());
    }

    #[tokio::test]
    async fn caller_request_id_is_kept() {
        let router = HttpServer::new(unreachable_config()).into_router();
        let request = Request::builder()
            .header(X_REQUEST_ID, "caller-42")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "caller-42");
    }
}
