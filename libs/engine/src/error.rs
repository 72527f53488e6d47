//! Engine error types
//!
//! Every write operation returns a typed result: a machine-checkable kind
//! plus a human-readable reason. Failures are all-or-nothing - no partial
//! mutation is ever observable - and adversarial input surfaces an error,
//! never a panic.

use market_amm::AmmError;
use market_types::{FixedPointError, MarketId};
use thiserror::Error;

/// Failure kinds for engine operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Operation is not legal in the market's current lifecycle phase
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Caller lacks the admin role required by this operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Zero, negative, or out-of-range input
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Unknown market or position
    #[error("Not found: {0}")]
    NotFound(String),

    /// Reward or refund was already claimed for this (market, account)
    #[error("Already claimed for market {market_id}")]
    AlreadyClaimed { market_id: MarketId },

    /// Cancellation blocked: the market has recorded trades
    #[error("Market {market_id} has recorded trades and cannot be cancelled")]
    MarketHasTrades { market_id: MarketId },

    /// Checked arithmetic failed; the operation was rejected, nothing wrapped
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl From<AmmError> for EngineError {
    fn from(err: AmmError) -> Self {
        match err {
            AmmError::InvalidAmount(reason) => EngineError::InvalidAmount(reason),
            AmmError::InvalidReserves(reason) => EngineError::InvalidState(reason),
            AmmError::ArithmeticOverflow => EngineError::ArithmeticOverflow,
        }
    }
}

impl From<FixedPointError> for EngineError {
    fn from(err: FixedPointError) -> Self {
        match err {
            FixedPointError::Overflow { .. } => EngineError::ArithmeticOverflow,
            other => EngineError::InvalidAmount(other.to_string()),
        }
    }
}
