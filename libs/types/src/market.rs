//! Market and position ledger records
//!
//! `Market` is the unit of state the engine serializes all writes against;
//! `Position` is the per-(market, account) share/cost record. Both are plain
//! data: the lifecycle rules that mutate them live in the engine crate, but
//! the structural facts (which states are terminal, when a market is
//! tradeable) are answered here so every consumer agrees on them.

use crate::fixed_point::TokenFixedPoint8;
use crate::identifiers::{AccountId, MarketId};
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a market
///
/// Transitions are monotone: `Active -> Closed -> Resolved`, or
/// `Active -> Cancelled` for untraded markets. No other edge exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketStatus {
    Active,
    Closed,
    Resolved,
    Cancelled,
}

impl MarketStatus {
    /// Terminal states freeze pools and share totals permanently
    pub fn is_terminal(self) -> bool {
        matches!(self, MarketStatus::Resolved | MarketStatus::Cancelled)
    }
}

/// Resolved outcome of a market; `Unset` until resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Unset,
    Yes,
    No,
}

/// Which side of the book a trade or pool refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Yes,
    No,
}

impl Side {
    pub fn from_is_yes(is_yes: bool) -> Self {
        if is_yes {
            Side::Yes
        } else {
            Side::No
        }
    }

    pub fn is_yes(self) -> bool {
        matches!(self, Side::Yes)
    }

    /// The outcome that pays this side
    pub fn winning_outcome(self) -> Outcome {
        match self {
            Side::Yes => Outcome::Yes,
            Side::No => Outcome::No,
        }
    }
}

/// Complete state of a single binary market
///
/// Pool balances are always strictly positive: creation splits the seed so
/// both sides start funded, and the pricing math never drains a side to
/// zero. Share totals only grow while the market trades and are frozen once
/// the status turns terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub question: String,
    pub description: String,

    /// Unix seconds at creation
    pub created_at: u64,
    /// Unix seconds after which trading stops and resolution becomes legal
    pub close_time: u64,

    pub yes_pool: TokenFixedPoint8,
    pub no_pool: TokenFixedPoint8,
    pub total_yes_shares: TokenFixedPoint8,
    pub total_no_shares: TokenFixedPoint8,

    pub status: MarketStatus,
    pub outcome: Outcome,

    pub seed_fund: TokenFixedPoint8,
    pub creator: AccountId,

    /// Fees this market contributed to the engine-wide accumulator
    pub collected_fees: TokenFixedPoint8,
    /// Number of committed trades; cancellation requires this to be zero
    pub trade_count: u64,
}

impl Market {
    /// Combined collateral backing both sides
    pub fn pool_total(&self) -> Option<TokenFixedPoint8> {
        self.yes_pool.checked_add(self.no_pool)
    }

    /// True once any trade has been recorded
    pub fn has_trades(&self) -> bool {
        self.trade_count > 0
    }

    /// Pool balance backing the given side
    pub fn pool(&self, side: Side) -> TokenFixedPoint8 {
        match side {
            Side::Yes => self.yes_pool,
            Side::No => self.no_pool,
        }
    }

    /// Total shares minted on the given side
    pub fn total_shares(&self, side: Side) -> TokenFixedPoint8 {
        match side {
            Side::Yes => self.total_yes_shares,
            Side::No => self.total_no_shares,
        }
    }
}

/// Per-(market, account) share and cost record
///
/// Created lazily on an account's first trade and never deleted; claiming
/// flips `claimed` but leaves the history intact for audit.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub yes_shares: TokenFixedPoint8,
    pub no_shares: TokenFixedPoint8,
    /// Cumulative amount paid for YES shares, fees included
    pub yes_cost: TokenFixedPoint8,
    /// Cumulative amount paid for NO shares, fees included
    pub no_cost: TokenFixedPoint8,
    pub claimed: bool,
}

impl Position {
    /// Shares held on the given side
    pub fn shares(&self, side: Side) -> TokenFixedPoint8 {
        match side {
            Side::Yes => self.yes_shares,
            Side::No => self.no_shares,
        }
    }

    /// Total amount the account has put into this market
    pub fn total_cost(&self) -> Option<TokenFixedPoint8> {
        self.yes_cost.checked_add(self.no_cost)
    }

    /// True when the record carries neither shares nor costs
    pub fn is_empty(&self) -> bool {
        self.yes_shares.is_zero()
            && self.no_shares.is_zero()
            && self.yes_cost.is_zero()
            && self.no_cost.is_zero()
    }
}
