//! # Binary Market AMM - Constant-Product Pricing Mathematics
//!
//! ## Purpose
//!
//! Pure mathematical core for pricing the two sides of a pooled-liquidity
//! binary market. Implements the constant-product rule over the YES/NO
//! collateral pools with exact integer arithmetic: fees are deducted in
//! basis points, the opposite pool is recomputed so `k = yes * no` never
//! decreases, and minted shares equal the opposite pool's decrease.
//!
//! ## Integration Points
//!
//! - **Input Sources**: pool balances from the market store, trade
//!   parameters from the lifecycle controller
//! - **Output Destinations**: lifecycle controller (pool deltas and minted
//!   shares), read APIs (exact rational prices), payout quoting
//! - **Precision**: scaled-integer amounts with `u128` intermediates; no
//!   floating point anywhere in the calculation path
//! - **Validation**: every input checked before math, every overflow fails
//!   closed with a typed error
//!
//! ## Architecture Role
//!
//! This crate holds no mutable state. The controller owns the pools and the
//! locks; everything here is a function from balances to deltas, which keeps
//! the conservation properties testable in isolation.

pub mod binary_math;

pub use binary_math::{
    mul_div_floor, AmmError, BinaryPoolState, CpmmMath, PricePair, TradeBreakdown,
};
