//! Request body transformation.
//!
//! # Data Flow
//! ```text
//! buffered JSON body
//!     → precise_amount.rs (parse, look up field, convert string → integer)
//!     → Transformed { body, outcome }
//!     → relay pipeline forwards `body`, reports `outcome` to the observer
//! ```
//!
//! # Design Decisions
//! - Pure functions: no I/O, no logging, no shared state
//! - Every failure path returns the original bytes untouched
//! - Amounts are parsed as arbitrary-precision integers, never machine words

pub mod precise_amount;

pub use precise_amount::{
    convert_precise_amount, Outcome, TransformError, Transformed, PRECISE_AMOUNT_FIELD,
};
