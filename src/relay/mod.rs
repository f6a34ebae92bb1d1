//! Relay pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (from http::server)
//!     → pipeline.rs (buffer body, maybe transform, build outbound request)
//!     → security::headers (drop Host, recompute Content-Length)
//!     → hyper-util client → upstream
//!     → pipeline.rs (buffer response, filter headers)
//!     → Response to caller
//!
//! Side channel:
//!     observer.rs receives received/forwarded/response/conversion events
//! ```
//!
//! # Design Decisions
//! - One pipeline value per process, cloned into every request task
//! - All per-request state lives on that task's stack
//! - Every failure ends the one request with an error status

pub mod error;
pub mod observer;
pub mod pipeline;

pub use error::RelayError;
pub use observer::{MessageView, NoopObserver, RelayObserver, TracingObserver};
pub use pipeline::RelayPipeline;
