//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay pipeline produces:
//!     → logging.rs (tracing subscriber: pretty or JSON to stdout)
//!     → metrics.rs (counters, histograms → Prometheus endpoint)
//!     → relay::observer (traffic records, through the subscriber)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing` everywhere
//! - Request ID flows through spans (tower-http request-id + trace layers)
//! - Metrics are cheap and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
