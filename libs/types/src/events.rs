//! Events emitted by the engine for external consumers
//!
//! One event per committed write operation. The stream is the sole
//! change-notification channel the engine exposes; display and notification
//! layers subscribe to it instead of reading engine state directly. Events
//! for the same market arrive in commit order; ordering across markets is
//! unspecified.

use crate::fixed_point::TokenFixedPoint8;
use crate::identifiers::{AccountId, MarketId};
use crate::market::Outcome;
use serde::{Deserialize, Serialize};

/// Structured notification of a committed engine write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarketEvent {
    MarketCreated {
        id: MarketId,
        question: String,
        close_time: u64,
        creator: AccountId,
        seed_fund: TokenFixedPoint8,
    },
    BetPlaced {
        id: MarketId,
        user: AccountId,
        is_yes: bool,
        amount: TokenFixedPoint8,
        shares: TokenFixedPoint8,
    },
    MarketResolved {
        id: MarketId,
        outcome: Outcome,
    },
    MarketCancelled {
        id: MarketId,
    },
    RewardClaimed {
        id: MarketId,
        user: AccountId,
        amount: TokenFixedPoint8,
    },
}

impl MarketEvent {
    /// The market this event belongs to; per-market streams are ordered
    pub fn market_id(&self) -> MarketId {
        match self {
            MarketEvent::MarketCreated { id, .. } => *id,
            MarketEvent::BetPlaced { id, .. } => *id,
            MarketEvent::MarketResolved { id, .. } => *id,
            MarketEvent::MarketCancelled { id } => *id,
            MarketEvent::RewardClaimed { id, .. } => *id,
        }
    }
}
