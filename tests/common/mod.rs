//! Shared mock upstreams and helpers for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, Response, Uri},
    routing::any,
    Router,
};
use precise_relay::config::UpstreamConfig;
use precise_relay::relay::{MessageView, RelayObserver};
use precise_relay::transform::{Outcome, TransformError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// A request as the upstream saw it.
#[derive(Debug)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Captured {
    pub fn values(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }
}

/// Start an axum upstream that records every request and echoes its body.
pub async fn start_capture_backend() -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route("/{*path}", any(capture))
        .route("/", any(capture))
        .with_state(tx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, rx)
}

async fn capture(
    State(tx): State<mpsc::UnboundedSender<Captured>>,
    request: Request<Body>,
) -> Response<Body> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let content_type = parts.headers.get(header::CONTENT_TYPE).cloned();

    let _ = tx.send(Captured {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        body: body.clone(),
    });

    let mut response = Response::builder().status(200).header("x-upstream", "echo");
    if let Some(content_type) = content_type {
        response = response.header(header::CONTENT_TYPE, content_type);
    }
    response.body(Body::from(body)).unwrap()
}

/// Start a raw TCP upstream that reads the request head and writes `response` verbatim.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        read_request_head(&mut socket).await;
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

/// Start an upstream that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// An address with nothing listening on it.
pub fn unreachable_addr() -> SocketAddr {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
}

pub fn upstream_for(addr: SocketAddr) -> UpstreamConfig {
    UpstreamConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        timeout_secs: 5,
    }
}

/// Observer that keeps every event for assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub received: Mutex<Vec<String>>,
    pub forwarded: Mutex<Vec<String>>,
    pub responses: Mutex<Vec<u16>>,
    pub conversions: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn conversions(&self) -> Vec<String> {
        self.conversions.lock().unwrap().clone()
    }
}

impl RelayObserver for RecordingObserver {
    fn request_received(&self, request: &MessageView<'_>) {
        self.received
            .lock()
            .unwrap()
            .push(format!("{} {}", request.method, request.uri));
    }

    fn request_forwarded(&self, request: &MessageView<'_>) {
        self.forwarded
            .lock()
            .unwrap()
            .push(format!("{} {}", request.method, request.uri));
    }

    fn response_received(
        &self,
        status: axum::http::StatusCode,
        _headers: &HeaderMap,
        _body: &[u8],
    ) {
        self.responses.lock().unwrap().push(status.as_u16());
    }

    fn conversion(&self, outcome: &Outcome) {
        let entry = match outcome {
            Outcome::Unchanged => "unchanged".to_string(),
            Outcome::Converted { original, value } => format!("converted {original} -> {value}"),
            Outcome::Failed(TransformError::InvalidPreciseAmount { original }) => {
                format!("invalid {original}")
            }
            Outcome::Failed(TransformError::Json(_)) => "json error".to_string(),
        };
        self.conversions.lock().unwrap().push(entry);
    }
}
