//! Header policy.
//!
//! # Data Flow
//! ```text
//! Inbound request headers
//!     → headers.rs (drop Host and framing, keep everything else)
//!     → Outbound request
//!
//! Upstream response headers
//!     → headers.rs (drop hop-by-hop and framing headers)
//!     → Response to caller
//! ```

pub mod headers;
