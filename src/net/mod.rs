//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → listener.rs (bind configured host:port)
//!     → Hand the bound socket to the HTTP layer
//! ```
//!
//! # Design Decisions
//! - A failed bind is fatal; nothing else at startup is
//! - No connection limits: each connection runs on its own task

pub mod listener;

pub use listener::{bind, ListenerError};
