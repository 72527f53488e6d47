//! Protocol fee accumulator
//!
//! Owner-withdrawable balance kept disjoint from all market pools so fees
//! never influence win/loss economics. Trade fees and payout dust accrue
//! here; the admin drains it at any time, independent of market lifecycles.

use market_types::TokenFixedPoint8;
use parking_lot::RwLock;

use crate::error::EngineError;

/// Engine-wide fee balance
#[derive(Debug, Default)]
pub struct FeeAccumulator {
    collected: RwLock<TokenFixedPoint8>,
}

impl FeeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a fee or dust amount to the withdrawable balance
    pub fn credit(&self, amount: TokenFixedPoint8) -> Result<(), EngineError> {
        if amount.is_zero() {
            return Ok(());
        }
        let mut collected = self.collected.write();
        *collected = collected
            .checked_add(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Current withdrawable balance
    pub fn balance(&self) -> TokenFixedPoint8 {
        *self.collected.read()
    }

    /// Drain the full balance, returning the amount withdrawn
    pub fn drain(&self) -> TokenFixedPoint8 {
        let mut collected = self.collected.write();
        std::mem::take(&mut *collected)
    }
}
