//! Position ledger
//!
//! Per-(market, account) share and cost bookkeeping on top of the store.
//! A fill is prepared as a pure computation - every checked operation runs
//! before anything mutates - and then applied in one step that updates the
//! position record and the market's share totals together, inside the same
//! critical section. The sum-of-shares invariant holds by construction:
//! there is no code path that touches one side without the other.

use market_types::{AccountId, Market, MarketId, Position, Side, TokenFixedPoint8};
use std::sync::Arc;

use crate::error::EngineError;
use crate::store::MarketStore;

/// Fully computed outcome of a fill, ready to apply
#[derive(Debug, Clone)]
pub struct FillDelta {
    user: AccountId,
    position: Position,
    total_yes_shares: TokenFixedPoint8,
    total_no_shares: TokenFixedPoint8,
}

/// Share/cost bookkeeping over the shared store
pub struct PositionLedger {
    store: Arc<MarketStore>,
}

impl PositionLedger {
    pub fn new(store: Arc<MarketStore>) -> Self {
        Self { store }
    }

    /// Compute the position and total updates for a fill without mutating
    ///
    /// `cost` is the gross amount the user paid (fees included), `shares`
    /// the amount minted by the pricing math. Fails on arithmetic overflow
    /// with nothing changed.
    pub fn prepare_fill(
        &self,
        market: &Market,
        user: AccountId,
        side: Side,
        cost: TokenFixedPoint8,
        shares: TokenFixedPoint8,
    ) -> Result<FillDelta, EngineError> {
        let mut position = self.store.position(market.id, user).unwrap_or_default();

        match side {
            Side::Yes => {
                position.yes_shares = position
                    .yes_shares
                    .checked_add(shares)
                    .ok_or(EngineError::ArithmeticOverflow)?;
                position.yes_cost = position
                    .yes_cost
                    .checked_add(cost)
                    .ok_or(EngineError::ArithmeticOverflow)?;
            }
            Side::No => {
                position.no_shares = position
                    .no_shares
                    .checked_add(shares)
                    .ok_or(EngineError::ArithmeticOverflow)?;
                position.no_cost = position
                    .no_cost
                    .checked_add(cost)
                    .ok_or(EngineError::ArithmeticOverflow)?;
            }
        }

        let mut total_yes_shares = market.total_yes_shares;
        let mut total_no_shares = market.total_no_shares;
        match side {
            Side::Yes => {
                total_yes_shares = total_yes_shares
                    .checked_add(shares)
                    .ok_or(EngineError::ArithmeticOverflow)?;
            }
            Side::No => {
                total_no_shares = total_no_shares
                    .checked_add(shares)
                    .ok_or(EngineError::ArithmeticOverflow)?;
            }
        }

        Ok(FillDelta {
            user,
            position,
            total_yes_shares,
            total_no_shares,
        })
    }

    /// Apply a prepared fill: one position and the market totals, together
    ///
    /// Infallible by design - everything fallible happened in
    /// [`prepare_fill`](Self::prepare_fill). The caller holds the market's
    /// write lock.
    pub fn apply_fill(&self, market: &mut Market, delta: FillDelta) {
        market.total_yes_shares = delta.total_yes_shares;
        market.total_no_shares = delta.total_no_shares;
        self.store.set_position(market.id, delta.user, delta.position);
    }

    /// Copy of an account's position, if one exists
    pub fn get(&self, market_id: MarketId, user: AccountId) -> Option<Position> {
        self.store.position(market_id, user)
    }

    /// Flip the claimed flag for an account; the record is created if the
    /// claim is a bare refund (cancelled-market creator)
    pub fn mark_claimed(&self, market_id: MarketId, user: AccountId) {
        let mut position = self.store.position(market_id, user).unwrap_or_default();
        position.claimed = true;
        self.store.set_position(market_id, user, position);
    }

    /// Audit helper: sum of recorded shares per side for one market
    pub fn sum_shares(&self, market_id: MarketId) -> (TokenFixedPoint8, TokenFixedPoint8) {
        self.store.positions_for(market_id).iter().fold(
            (TokenFixedPoint8::ZERO, TokenFixedPoint8::ZERO),
            |(yes, no), (_, position)| {
                (
                    yes.saturating_add(position.yes_shares),
                    no.saturating_add(position.no_shares),
                )
            },
        )
    }
}
