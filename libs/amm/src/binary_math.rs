//! Constant-product math for two-sided binary market pools
//!
//! All calculations use scaled-integer amounts widened to `u128` so no
//! intermediate can wrap. Rounding always favors the pool: fees floor toward
//! the payer, the recomputed opposite pool rounds up, payout quotes floor
//! down. The product `yes * no` is therefore non-decreasing across any
//! sequence of trades.

use market_types::{Side, TokenFixedPoint8};
use thiserror::Error;

/// Basis-point denominator: 10000 = 100%
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Pricing errors surfaced to the lifecycle controller
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmmError {
    /// Zero, out-of-range, or otherwise unusable trade input
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Pool balances violate the strictly-positive invariant
    #[error("Invalid reserves: {0}")]
    InvalidReserves(String),

    /// An intermediate value exceeded the representable range
    #[error("Arithmetic overflow in pool calculation")]
    ArithmeticOverflow,
}

/// Balances of the two collateral pools backing one market
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryPoolState {
    pub yes_pool: TokenFixedPoint8,
    pub no_pool: TokenFixedPoint8,
}

impl BinaryPoolState {
    pub fn new(yes_pool: TokenFixedPoint8, no_pool: TokenFixedPoint8) -> Self {
        Self { yes_pool, no_pool }
    }

    /// Balance backing the given side
    pub fn pool(&self, side: Side) -> TokenFixedPoint8 {
        match side {
            Side::Yes => self.yes_pool,
            Side::No => self.no_pool,
        }
    }

    fn validate(&self) -> Result<(), AmmError> {
        if self.yes_pool.is_zero() || self.no_pool.is_zero() {
            return Err(AmmError::InvalidReserves(format!(
                "pools must be strictly positive, got yes={} no={}",
                self.yes_pool, self.no_pool
            )));
        }
        Ok(())
    }
}

/// Exact rational price pair for a market
///
/// `P(yes) = yes_numerator / denominator` and symmetrically for NO. The
/// numerators sum to the denominator by construction, so the two
/// probabilities add to exactly one - no float ever enters the calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePair {
    /// NO-side pool balance: the numerator of P(yes)
    pub yes_numerator: TokenFixedPoint8,
    /// YES-side pool balance: the numerator of P(no)
    pub no_numerator: TokenFixedPoint8,
    /// Combined pool balance
    pub denominator: TokenFixedPoint8,
}

impl PricePair {
    /// P(yes) as f64, for display only
    pub fn yes_probability(&self) -> f64 {
        self.yes_numerator.raw_value() as f64 / self.denominator.raw_value() as f64
    }
}

/// Full accounting of one estimated trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeBreakdown {
    /// Protocol fee taken off the gross amount
    pub fee: TokenFixedPoint8,
    /// Amount that actually entered the chosen pool
    pub net_amount: TokenFixedPoint8,
    pub new_yes_pool: TokenFixedPoint8,
    pub new_no_pool: TokenFixedPoint8,
    /// Shares minted to the trader: the opposite pool's decrease
    pub shares: TokenFixedPoint8,
}

/// Binary-market constant-product math
pub struct CpmmMath;

impl CpmmMath {
    /// Exact rational prices from current pool balances
    ///
    /// P(yes) = no_pool / (yes_pool + no_pool): the cheaper a side's pool,
    /// the more the market believes in it.
    pub fn price(pools: &BinaryPoolState) -> Result<PricePair, AmmError> {
        pools.validate()?;
        let denominator = pools
            .yes_pool
            .checked_add(pools.no_pool)
            .ok_or(AmmError::ArithmeticOverflow)?;
        Ok(PricePair {
            yes_numerator: pools.no_pool,
            no_numerator: pools.yes_pool,
            denominator,
        })
    }

    /// Estimate a trade against the pools using the x*y=k rule
    ///
    /// Fee (basis points) is floor-deducted from `amount`; the net enters
    /// the chosen pool; the opposite pool becomes `ceil(k / new_same)` so k
    /// never decreases; minted shares equal the opposite pool's decrease.
    pub fn estimate_trade(
        pools: &BinaryPoolState,
        amount: TokenFixedPoint8,
        side: Side,
        fee_bps: u32,
    ) -> Result<TradeBreakdown, AmmError> {
        pools.validate()?;
        if amount.is_zero() {
            return Err(AmmError::InvalidAmount(
                "trade amount must be positive".to_string(),
            ));
        }
        if fee_bps >= BPS_DENOMINATOR {
            return Err(AmmError::InvalidAmount(format!(
                "fee_bps must be below {}, got {}",
                BPS_DENOMINATOR, fee_bps
            )));
        }

        let fee = amount
            .checked_mul_bps(fee_bps)
            .ok_or(AmmError::ArithmeticOverflow)?;
        let net_amount = amount
            .checked_sub(fee)
            .ok_or(AmmError::ArithmeticOverflow)?;
        if net_amount.is_zero() {
            return Err(AmmError::InvalidAmount(
                "amount too small: nothing left after fee deduction".to_string(),
            ));
        }

        let same = pools.pool(side);
        let opposite = pools.pool(opposite_of(side));

        // u64 * u64 always fits in u128
        let k = same.raw_u128() * opposite.raw_u128();

        let new_same = same
            .checked_add(net_amount)
            .ok_or(AmmError::ArithmeticOverflow)?;
        let new_opposite_raw = ceil_div(k, new_same.raw_u128());
        // new_opposite <= opposite, so the narrowing cannot fail
        let new_opposite = TokenFixedPoint8::from_raw(
            u64::try_from(new_opposite_raw).map_err(|_| AmmError::ArithmeticOverflow)?,
        );

        let shares = opposite
            .checked_sub(new_opposite)
            .ok_or(AmmError::ArithmeticOverflow)?;

        let (new_yes_pool, new_no_pool) = match side {
            Side::Yes => (new_same, new_opposite),
            Side::No => (new_opposite, new_same),
        };

        Ok(TradeBreakdown {
            fee,
            net_amount,
            new_yes_pool,
            new_no_pool,
            shares,
        })
    }

    /// Split a seed fund into initial pools per a target YES probability
    ///
    /// `yes_basis_points` is the target P(yes); since P(yes) is priced off
    /// the NO pool, the NO pool receives that fraction of the seed. Both
    /// sides are clamped strictly positive and always sum to the full seed.
    pub fn split_seed(
        seed_fund: TokenFixedPoint8,
        yes_basis_points: u32,
    ) -> Result<(TokenFixedPoint8, TokenFixedPoint8), AmmError> {
        if seed_fund.is_zero() {
            return Err(AmmError::InvalidAmount(
                "seed fund must be positive".to_string(),
            ));
        }
        if yes_basis_points == 0 || yes_basis_points >= BPS_DENOMINATOR {
            return Err(AmmError::InvalidAmount(format!(
                "yes_basis_points must be in 1..={}, got {}",
                BPS_DENOMINATOR - 1,
                yes_basis_points
            )));
        }
        if seed_fund.raw_value() < 2 {
            return Err(AmmError::InvalidAmount(
                "seed fund too small to fund both pools".to_string(),
            ));
        }

        let no_pool = seed_fund
            .checked_mul_bps(yes_basis_points)
            .ok_or(AmmError::ArithmeticOverflow)?;
        let yes_pool = seed_fund
            .checked_sub(no_pool)
            .ok_or(AmmError::ArithmeticOverflow)?;

        // Clamp so neither side starts empty; the sum stays exactly seed_fund
        let one = TokenFixedPoint8::ONE_UNIT;
        let (yes_pool, no_pool) = if yes_pool.is_zero() {
            (one, seed_fund.checked_sub(one).unwrap_or(one))
        } else if no_pool.is_zero() {
            (seed_fund.checked_sub(one).unwrap_or(one), one)
        } else {
            (yes_pool, no_pool)
        };

        Ok((yes_pool, no_pool))
    }

    /// Quote the payout a bet would earn if its side wins
    ///
    /// Composes a trade estimate with the pro-rata payout rule:
    /// `shares * pool_total_after / (side_total_shares + shares)`, floored.
    pub fn potential_payout(
        pools: &BinaryPoolState,
        side_total_shares: TokenFixedPoint8,
        amount: TokenFixedPoint8,
        side: Side,
        fee_bps: u32,
    ) -> Result<TokenFixedPoint8, AmmError> {
        let breakdown = Self::estimate_trade(pools, amount, side, fee_bps)?;
        let pool_total = breakdown
            .new_yes_pool
            .checked_add(breakdown.new_no_pool)
            .ok_or(AmmError::ArithmeticOverflow)?;
        let winning_total = side_total_shares
            .checked_add(breakdown.shares)
            .ok_or(AmmError::ArithmeticOverflow)?;
        if winning_total.is_zero() {
            return Ok(TokenFixedPoint8::ZERO);
        }
        mul_div_floor(breakdown.shares, pool_total, winning_total)
            .ok_or(AmmError::ArithmeticOverflow)
    }
}

/// floor(a * b / denominator) with a u128 intermediate
///
/// Returns None when the denominator is zero or the quotient does not fit
/// back into an amount.
pub fn mul_div_floor(
    a: TokenFixedPoint8,
    b: TokenFixedPoint8,
    denominator: TokenFixedPoint8,
) -> Option<TokenFixedPoint8> {
    if denominator.is_zero() {
        return None;
    }
    let product = a.raw_u128() * b.raw_u128();
    u64::try_from(product / denominator.raw_u128())
        .ok()
        .map(TokenFixedPoint8::from_raw)
}

fn opposite_of(side: Side) -> Side {
    match side {
        Side::Yes => Side::No,
        Side::No => Side::Yes,
    }
}

fn ceil_div(numerator: u128, denominator: u128) -> u128 {
    // denominator is a pool balance plus a positive net amount, never zero
    (numerator + denominator - 1) / denominator
}
