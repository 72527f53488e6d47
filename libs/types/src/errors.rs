//! Error types for fixed-point arithmetic and identifier validation
//!
//! Covers overflow, underflow, and conversion failures at the numeric
//! boundary of the engine. Lifecycle errors live in the engine crate.

use thiserror::Error;

/// Errors that can occur when constructing or combining fixed-point amounts
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FixedPointError {
    /// Value exceeds the maximum representable amount
    #[error("Overflow: value {value} exceeds maximum representable amount")]
    Overflow { value: String },

    /// Amounts are unsigned; negative inputs are rejected at the boundary
    #[error("Negative amount not representable: '{input}'")]
    Negative { input: String },

    /// Invalid decimal string format
    #[error("Invalid decimal string: '{input}' - expected numeric format")]
    InvalidDecimal { input: String },

    /// Value is not finite (NaN or infinity)
    #[error("Value is not finite: {value}")]
    NotFinite { value: f64 },
}
