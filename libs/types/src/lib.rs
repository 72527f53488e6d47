//! Shared type system for the binary market engine
//!
//! Provides the vocabulary every other crate speaks: fixed-point collateral
//! amounts with checked arithmetic, typed identifiers for markets and
//! accounts, the Market/Position ledger records with their structural
//! invariants, and the event payloads the engine hands to external
//! consumers.
//!
//! ## Design Principles
//!
//! - **No Precision Loss**: all monetary values stored as scaled integers
//! - **Overflow Protection**: checked arithmetic with clear error handling
//! - **Type Safety**: distinct id types prevent mixing markets and accounts
//! - **Transport Neutrality**: events are plain data, no wire format attached

pub mod errors;
pub mod events;
pub mod fixed_point;
pub mod identifiers;
pub mod market;

pub use errors::FixedPointError;
pub use events::MarketEvent;
pub use fixed_point::TokenFixedPoint8;
pub use identifiers::{AccountId, IdentifierError, MarketId};
pub use market::{Market, MarketStatus, Outcome, Position, Side};
