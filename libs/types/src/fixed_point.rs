//! Fixed-point arithmetic for collateral amounts
//!
//! All pool balances, share counts, costs, and fees are stored as scaled
//! unsigned integers to prevent precision loss in market accounting.
//! Products and quotients widen to `u128` so intermediate values cannot wrap
//! silently; every fallible operation is checked and surfaces `None` for the
//! caller to turn into a typed overflow error.

use crate::errors::FixedPointError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-point collateral amount with 8 decimal places precision
///
/// Scale factor: 100,000,000 (10^8)
///
/// Examples:
/// - 1 token       = TokenFixedPoint8(100_000_000)
/// - 0.00000001    = TokenFixedPoint8(1)
/// - 1000.12345678 = TokenFixedPoint8(100_012_345_678)
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TokenFixedPoint8(pub u64);

impl TokenFixedPoint8 {
    /// Scale factor for 8 decimal places
    pub const SCALE: u64 = 100_000_000;

    /// Maximum representable amount
    pub const MAX: Self = Self(u64::MAX);

    /// Zero collateral
    pub const ZERO: Self = Self(0);

    /// Smallest non-zero amount (one raw unit)
    pub const ONE_UNIT: Self = Self(1);

    /// One whole token
    pub const ONE_TOKEN: Self = Self(Self::SCALE);

    /// Create from a decimal string with exact parsing
    ///
    /// This is the primary method for creating amounts from external data
    /// (JSON, configuration files, user input).
    pub fn from_decimal_str(s: &str) -> Result<Self, FixedPointError> {
        use std::str::FromStr;

        let decimal = Decimal::from_str(s).map_err(|_| FixedPointError::InvalidDecimal {
            input: s.to_string(),
        })?;

        if decimal.is_sign_negative() && !decimal.is_zero() {
            return Err(FixedPointError::Negative {
                input: s.to_string(),
            });
        }

        let scaled = decimal * Decimal::from(Self::SCALE);
        match scaled.to_u64() {
            Some(value) => Ok(Self(value)),
            None => Err(FixedPointError::Overflow {
                value: s.to_string(),
            }),
        }
    }

    /// Convert to f64 for display or interfacing with floating-point systems
    ///
    /// # Warning
    /// Only use for display and logging. Never use for market accounting.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    /// Exact decimal rendering of the amount
    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(Self::SCALE)
    }

    /// Get the raw scaled integer value
    pub fn raw_value(self) -> u64 {
        self.0
    }

    /// Widen to u128 for overflow-free intermediate products
    pub fn raw_u128(self) -> u128 {
        self.0 as u128
    }

    /// Create from raw scaled integer (advanced usage)
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Create from whole tokens (compile-time constant for tests and seeds)
    #[inline]
    pub const fn from_tokens(tokens: u64) -> Self {
        Self(tokens * Self::SCALE)
    }

    /// True when the amount is zero
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    // CHECKED ARITHMETIC - for ledger mutations where overflow must be handled

    /// Checked addition - returns None on overflow
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction - returns None on underflow
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Checked basis-point fraction: floor(self * bps / 10000)
    ///
    /// Used for fee extraction and seed splitting. Floor division keeps the
    /// remainder with the payer side of the calculation.
    pub fn checked_mul_bps(self, bps: u32) -> Option<Self> {
        let scaled = self.raw_u128().checked_mul(bps as u128)?;
        u64::try_from(scaled / 10_000).ok().map(Self)
    }

    // SATURATING ARITHMETIC - for statistics and display where clamping is fine

    /// Saturating addition - clamps to max on overflow
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction - clamps to zero on underflow
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

/// Display implementation for convenient logging
impl fmt::Display for TokenFixedPoint8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.8}", self.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_from_decimal_str() {
        let amount = TokenFixedPoint8::from_decimal_str("123.45678901").unwrap();
        assert_eq!(amount.raw_value(), 12_345_678_901);

        let whole = TokenFixedPoint8::from_decimal_str("10").unwrap();
        assert_eq!(whole, TokenFixedPoint8::from_tokens(10));
    }

    #[test]
    fn test_constants() {
        assert_eq!(TokenFixedPoint8::ZERO.to_f64(), 0.0);
        assert_eq!(TokenFixedPoint8::ONE_TOKEN.to_f64(), 1.0);
        assert_eq!(TokenFixedPoint8::ONE_UNIT.raw_value(), 1);
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = TokenFixedPoint8::from_tokens(2);
        let b = TokenFixedPoint8::ONE_TOKEN;

        assert_eq!(a.checked_add(b).unwrap(), TokenFixedPoint8::from_tokens(3));
        assert_eq!(a.checked_sub(b).unwrap(), TokenFixedPoint8::ONE_TOKEN);
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(TokenFixedPoint8::MAX.checked_add(b), None);
    }

    #[test]
    fn test_mul_bps() {
        // 1% of 100 tokens
        let amount = TokenFixedPoint8::from_tokens(100);
        assert_eq!(
            amount.checked_mul_bps(100).unwrap(),
            TokenFixedPoint8::ONE_TOKEN
        );

        // Floor behavior: 1 raw unit at 9999 bps rounds down to zero
        assert_eq!(
            TokenFixedPoint8::ONE_UNIT.checked_mul_bps(9_999).unwrap(),
            TokenFixedPoint8::ZERO
        );

        // Full 10000 bps is the identity
        assert_eq!(amount.checked_mul_bps(10_000).unwrap(), amount);
    }

    #[test]
    fn test_error_handling() {
        assert!(TokenFixedPoint8::from_decimal_str("not_a_number").is_err());
        assert!(matches!(
            TokenFixedPoint8::from_decimal_str("-1.5"),
            Err(FixedPointError::Negative { .. })
        ));
        assert!(matches!(
            TokenFixedPoint8::from_decimal_str("999999999999999999999"),
            Err(FixedPointError::Overflow { .. })
        ));
    }

    #[test]
    fn test_display_formatting() {
        let amount = TokenFixedPoint8::from_decimal_str("123.456789").unwrap();
        assert_eq!(format!("{}", amount), "123.45678900");
    }
}
