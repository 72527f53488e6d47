//! Market and position store
//!
//! Core state management for all markets. Each market lives behind its own
//! `RwLock` inside a `DashMap`, giving writers per-market exclusivity while
//! operations on different markets proceed fully in parallel - there is no
//! global lock. Positions sit in a composite-key map and are only mutated
//! while the owning market's write lock is held, which is what makes the
//! share-sum invariant enforceable.
//!
//! Markets are never physically deleted: resolution and cancellation are
//! terminal logical states, and the records stay behind for audit and claim
//! processing.

use dashmap::DashMap;
use market_types::{AccountId, Market, MarketId, MarketStatus, Outcome, Position, TokenFixedPoint8};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::error::EngineError;

/// Running totals across the whole store
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_markets: usize,
    pub total_trades: u64,
    pub total_volume: TokenFixedPoint8,
    pub last_update_secs: u64,
}

/// Keyed storage for markets and positions
pub struct MarketStore {
    /// All markets, each behind its own lock
    markets: DashMap<MarketId, Arc<RwLock<Market>>>,

    /// Position records keyed by (market, account); mutated only under the
    /// owning market's write lock
    positions: DashMap<(MarketId, AccountId), Position>,

    /// Monotonic id source; ids start at 1 so zero never names a market
    next_id: AtomicU64,

    /// Statistics
    stats: Arc<RwLock<StoreStats>>,
}

impl Default for MarketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketStore {
    pub fn new() -> Self {
        Self {
            markets: DashMap::new(),
            positions: DashMap::new(),
            next_id: AtomicU64::new(1),
            stats: Arc::new(RwLock::new(StoreStats::default())),
        }
    }

    /// Reserve the next market id
    pub fn allocate_id(&self) -> MarketId {
        MarketId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Make a market entry visible after validating it
    ///
    /// The caller may already hold the entry's write lock (to serialize the
    /// creation event against concurrent access), so validation takes the
    /// market by reference instead of locking.
    pub fn publish(
        &self,
        market: &Market,
        entry: Arc<RwLock<Market>>,
    ) -> Result<(), EngineError> {
        Self::validate(market)?;
        if self.markets.contains_key(&market.id) {
            return Err(EngineError::InvalidState(format!(
                "market {} already exists",
                market.id
            )));
        }
        self.markets.insert(market.id, entry);

        let mut stats = self.stats.write();
        stats.total_markets = self.markets.len();
        debug!("Stored market {} ({} total)", market.id, stats.total_markets);
        Ok(())
    }

    /// Get a market entry for locking
    pub fn market(&self, id: MarketId) -> Option<Arc<RwLock<Market>>> {
        self.markets.get(&id).map(|entry| entry.clone())
    }

    /// Consistent point-in-time copy of a market
    pub fn snapshot(&self, id: MarketId) -> Option<Market> {
        self.market(id).map(|entry| entry.read().clone())
    }

    /// All known market ids in ascending order
    pub fn market_ids(&self) -> Vec<MarketId> {
        let mut ids: Vec<MarketId> = self.markets.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }

    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    /// Copy of a position record, if one was ever created
    pub fn position(&self, id: MarketId, user: AccountId) -> Option<Position> {
        self.positions.get(&(id, user)).map(|entry| entry.clone())
    }

    /// Write a position record; the caller holds the market's write lock
    pub fn set_position(&self, id: MarketId, user: AccountId, position: Position) {
        self.positions.insert((id, user), position);
    }

    /// All positions recorded against one market
    pub fn positions_for(&self, id: MarketId) -> Vec<(AccountId, Position)> {
        self.positions
            .iter()
            .filter(|entry| entry.key().0 == id)
            .map(|entry| (entry.key().1, entry.value().clone()))
            .collect()
    }

    /// Record a committed trade in the running totals
    pub fn record_trade(&self, volume: TokenFixedPoint8, now_secs: u64) {
        let mut stats = self.stats.write();
        stats.total_trades += 1;
        stats.total_volume = stats.total_volume.saturating_add(volume);
        stats.last_update_secs = now_secs;
    }

    /// Get statistics
    pub fn stats(&self) -> StoreStats {
        self.stats.read().clone()
    }

    /// Structural invariants every stored market must satisfy
    ///
    /// Checked on publish and again before any mutation commits; a market
    /// that fails here never becomes observable.
    pub fn validate(market: &Market) -> Result<(), EngineError> {
        if market.yes_pool.is_zero() || market.no_pool.is_zero() {
            return Err(EngineError::InvalidState(format!(
                "market {} pools must be strictly positive",
                market.id
            )));
        }
        if market.close_time <= market.created_at {
            return Err(EngineError::InvalidState(format!(
                "market {} close time must be after creation",
                market.id
            )));
        }
        match market.status {
            MarketStatus::Resolved => {
                if market.outcome == Outcome::Unset {
                    return Err(EngineError::InvalidState(format!(
                        "resolved market {} must carry an outcome",
                        market.id
                    )));
                }
            }
            MarketStatus::Cancelled => {
                if market.has_trades() {
                    return Err(EngineError::InvalidState(format!(
                        "cancelled market {} must have zero trades",
                        market.id
                    )));
                }
            }
            MarketStatus::Active | MarketStatus::Closed => {
                if market.outcome != Outcome::Unset {
                    return Err(EngineError::InvalidState(format!(
                        "market {} cannot carry an outcome before resolution",
                        market.id
                    )));
                }
            }
        }
        Ok(())
    }
}
