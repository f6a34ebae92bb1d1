//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (one deadline for send + body read)
//!     → On expiry: 504 Gateway Timeout
//! ```
//!
//! # Design Decisions
//! - No retries: a failed upstream call fails the request
//! - Deadline is optional; disabled means the transport decides

pub mod timeouts;
