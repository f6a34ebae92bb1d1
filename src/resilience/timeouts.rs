//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with a deadline
//! - Share one deadline across several awaits of the same exchange
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{self, Instant};

/// The deadline passed before the future completed.
#[derive(Debug, Clone, Copy, Error)]
#[error("deadline exceeded")]
pub struct TimedOut;

/// A point in time shared by every step of one upstream exchange.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// Start counting now. `None` never expires.
    pub fn after(limit: Option<Duration>) -> Self {
        Self {
            at: limit.map(|d| Instant::now() + d),
        }
    }

    /// Drive `future` to completion unless the deadline passes first.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, TimedOut> {
        match self.at {
            Some(at) => time::timeout_at(at, future).await.map_err(|_| TimedOut),
            None => Ok(future.await),
        }
    }
}
