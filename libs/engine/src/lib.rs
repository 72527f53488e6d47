//! # Binary Market Engine - Pooled-Liquidity Market Lifecycle
//!
//! ## Purpose
//!
//! Deterministic engine for binary-outcome prediction markets backed by a
//! shared collateral pool: pricing, share accounting, and the
//! resolve/claim/cancel lifecycle. Everything around it - display layers,
//! notification feeds, identity handling - is an external collaborator that
//! reads snapshots and consumes the event stream this engine emits.
//!
//! ## Integration Points
//!
//! - **Input Sources**: caller operations (create/bet/resolve/cancel/claim)
//!   with explicit caller identities; pricing math from `market-amm`
//! - **Output Destinations**: market/position snapshots, exact rational
//!   prices, the append-only [`MarketEvent`](market_types::MarketEvent) log
//!   with channel fan-out
//! - **Concurrency**: per-market exclusive writes, cross-market parallelism,
//!   snapshot reads that never observe a partially applied trade
//! - **Determinism**: time enters only through the [`Clock`] seam; no I/O
//!   anywhere in the engine
//!
//! ## Architecture Role
//!
//! ```text
//! Caller Operations → [Lifecycle Controller] → Market/Position Store
//!        ↓                    ↓                        ↓
//! Identity Checks      Pricing (market-amm)     Per-Market Locks
//! Time Validation      Payout Computation       Position Ledger
//! Typed Errors         Fee Accumulation         Event Log → Subscribers
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod fees;
pub mod ledger;
pub mod payout;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{BetReceipt, MarketEngine};
pub use error::EngineError;
pub use events::EventLog;
pub use fees::FeeAccumulator;
pub use ledger::PositionLedger;
pub use store::{MarketStore, StoreStats};
