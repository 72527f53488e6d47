//! Claim and refund computation
//!
//! Resolved markets pay the combined pool pro-rata to winning-side share
//! holders with floor division; the rounding remainder ("dust") is swept to
//! the fee accumulator once, at resolution time, when every position is
//! frozen and enumerable. Cancelled markets refund contributed costs - and
//! the seed fund to the creator - since no outcome was determined.

use market_amm::mul_div_floor;
use market_types::{
    AccountId, Market, MarketStatus, Outcome, Position, Side, TokenFixedPoint8,
};

use crate::error::EngineError;

/// Side that pays out under the given outcome
fn winning_side(outcome: Outcome) -> Result<Side, EngineError> {
    match outcome {
        Outcome::Yes => Ok(Side::Yes),
        Outcome::No => Ok(Side::No),
        Outcome::Unset => Err(EngineError::InvalidState(
            "market has no resolved outcome".to_string(),
        )),
    }
}

/// Amount one account can claim from a terminal market
///
/// Resolved: `winning_shares * pool_total / winning_total`, floored; losing
/// shares pay zero. Cancelled: refund of the account's own contributions,
/// plus the seed fund when the account is the creator.
pub fn claim_amount(
    market: &Market,
    user: AccountId,
    position: &Position,
) -> Result<TokenFixedPoint8, EngineError> {
    match market.status {
        MarketStatus::Resolved => {
            let side = winning_side(market.outcome)?;
            let winning_shares = position.shares(side);
            if winning_shares.is_zero() {
                return Ok(TokenFixedPoint8::ZERO);
            }
            let pool_total = market
                .pool_total()
                .ok_or(EngineError::ArithmeticOverflow)?;
            let winning_total = market.total_shares(side);
            mul_div_floor(winning_shares, pool_total, winning_total)
                .ok_or(EngineError::ArithmeticOverflow)
        }
        MarketStatus::Cancelled => {
            let mut refund = position
                .total_cost()
                .ok_or(EngineError::ArithmeticOverflow)?;
            if user == market.creator {
                refund = refund
                    .checked_add(market.seed_fund)
                    .ok_or(EngineError::ArithmeticOverflow)?;
            }
            Ok(refund)
        }
        _ => Err(EngineError::InvalidState(format!(
            "market {} is not resolved or cancelled",
            market.id
        ))),
    }
}

/// Pool remainder left over by floor division across all winning positions
///
/// Computed at resolution, before any claim runs: the positions passed in
/// are frozen from that point on, so the sum of future claim payouts plus
/// this dust equals the pool exactly. When nobody holds winning shares the
/// entire pool is dust.
pub fn resolution_dust(
    market: &Market,
    outcome: Outcome,
    positions: &[(AccountId, Position)],
) -> Result<TokenFixedPoint8, EngineError> {
    let side = winning_side(outcome)?;
    let pool_total = market
        .pool_total()
        .ok_or(EngineError::ArithmeticOverflow)?;
    let winning_total = market.total_shares(side);
    if winning_total.is_zero() {
        return Ok(pool_total);
    }

    let mut paid = TokenFixedPoint8::ZERO;
    for (_, position) in positions {
        let shares = position.shares(side);
        if shares.is_zero() {
            continue;
        }
        let payout = mul_div_floor(shares, pool_total, winning_total)
            .ok_or(EngineError::ArithmeticOverflow)?;
        paid = paid
            .checked_add(payout)
            .ok_or(EngineError::ArithmeticOverflow)?;
    }

    // Floor payouts can never exceed the pool they divide
    pool_total
        .checked_sub(paid)
        .ok_or(EngineError::ArithmeticOverflow)
}
