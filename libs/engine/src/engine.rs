//! Market lifecycle controller
//!
//! `MarketEngine` is the single entry point for every read and write. Each
//! write validates state, time, and authorization, delegates the arithmetic
//! to the pricing math, and commits the resulting deltas under the target
//! market's write lock - compute first, validate, then assign, so a failure
//! at any point leaves no observable change. One event is emitted per
//! committed write, while the lock is still held, which pins per-market
//! event order to commit order.
//!
//! Admin authority is explicit: resolve, cancel, and fee withdrawal take a
//! caller identity that is checked against the configured admin account.
//! There is no ambient privileged context.

use crossbeam_channel::Receiver;
use market_amm::{BinaryPoolState, CpmmMath, PricePair};
use market_types::{
    AccountId, Market, MarketEvent, MarketId, MarketStatus, Outcome, Position, Side,
    TokenFixedPoint8,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::EventLog;
use crate::fees::FeeAccumulator;
use crate::ledger::PositionLedger;
use crate::payout;
use crate::store::{MarketStore, StoreStats};

/// Result of a committed bet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetReceipt {
    pub market_id: MarketId,
    /// Shares minted to the bettor
    pub shares: TokenFixedPoint8,
    /// Protocol fee taken off the gross amount
    pub fee: TokenFixedPoint8,
    /// Amount that entered the pool
    pub net_amount: TokenFixedPoint8,
}

/// Deterministic pooled-liquidity binary market engine
pub struct MarketEngine {
    store: Arc<MarketStore>,
    ledger: PositionLedger,
    fees: FeeAccumulator,
    events: EventLog,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl MarketEngine {
    /// Create an engine on wall-clock time
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an engine with an explicit time source (tests, replays)
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Result<Self, EngineError> {
        config
            .validate()
            .map_err(|e| EngineError::InvalidAmount(e.to_string()))?;
        let store = Arc::new(MarketStore::new());
        Ok(Self {
            ledger: PositionLedger::new(store.clone()),
            store,
            fees: FeeAccumulator::new(),
            events: EventLog::new(),
            clock,
            config,
        })
    }

    // ---- write operations ------------------------------------------------

    /// Create a market, splitting the seed per the target YES probability
    pub fn create_market(
        &self,
        creator: AccountId,
        question: &str,
        description: &str,
        duration_secs: u64,
        seed_fund: TokenFixedPoint8,
        yes_basis_points: u32,
    ) -> Result<MarketId, EngineError> {
        if question.trim().is_empty() {
            return Err(EngineError::InvalidAmount(
                "question must not be empty".to_string(),
            ));
        }
        if duration_secs == 0 {
            return Err(EngineError::InvalidAmount(
                "duration must be positive".to_string(),
            ));
        }

        let (yes_pool, no_pool) = CpmmMath::split_seed(seed_fund, yes_basis_points)?;
        let now = self.clock.now_secs();
        let close_time = now
            .checked_add(duration_secs)
            .ok_or(EngineError::ArithmeticOverflow)?;

        let id = self.store.allocate_id();
        let market = Market {
            id,
            question: question.to_string(),
            description: description.to_string(),
            created_at: now,
            close_time,
            yes_pool,
            no_pool,
            total_yes_shares: TokenFixedPoint8::ZERO,
            total_no_shares: TokenFixedPoint8::ZERO,
            status: MarketStatus::Active,
            outcome: Outcome::Unset,
            seed_fund,
            creator,
            collected_fees: TokenFixedPoint8::ZERO,
            trade_count: 0,
        };

        // Publish while holding the entry's write lock so no concurrent
        // operation can slot an event in front of MarketCreated
        let entry = Arc::new(RwLock::new(market));
        let guard = entry.write();
        self.store.publish(&guard, entry.clone())?;
        self.events.emit(MarketEvent::MarketCreated {
            id,
            question: guard.question.clone(),
            close_time,
            creator,
            seed_fund,
        });
        info!(
            "Created market {}: \"{}\" seed={} yes_bp={} closes_at={}",
            id, guard.question, seed_fund, yes_basis_points, close_time
        );
        drop(guard);

        Ok(id)
    }

    /// Buy into one side of an active market
    pub fn place_bet(
        &self,
        user: AccountId,
        market_id: MarketId,
        is_yes: bool,
        amount: TokenFixedPoint8,
    ) -> Result<BetReceipt, EngineError> {
        if amount.is_zero() {
            return Err(EngineError::InvalidAmount(
                "bet amount must be positive".to_string(),
            ));
        }

        let entry = self.market_entry(market_id)?;
        let mut market = entry.write();

        if market.status != MarketStatus::Active {
            return Err(EngineError::InvalidState(format!(
                "market {} is not active",
                market_id
            )));
        }
        let now = self.clock.now_secs();
        if now >= market.close_time {
            return Err(EngineError::InvalidState(format!(
                "market {} is past its close time",
                market_id
            )));
        }

        let side = Side::from_is_yes(is_yes);
        let pools = BinaryPoolState::new(market.yes_pool, market.no_pool);
        let breakdown = CpmmMath::estimate_trade(&pools, amount, side, self.config.fee_bps)?;
        if breakdown.new_yes_pool.is_zero() || breakdown.new_no_pool.is_zero() {
            return Err(EngineError::InvalidState(format!(
                "trade would drain a pool of market {}",
                market_id
            )));
        }

        // Everything fallible runs before the first mutation
        let fill = self
            .ledger
            .prepare_fill(&market, user, side, amount, breakdown.shares)?;
        let collected_fees = market
            .collected_fees
            .checked_add(breakdown.fee)
            .ok_or(EngineError::ArithmeticOverflow)?;
        self.fees.credit(breakdown.fee)?;

        market.yes_pool = breakdown.new_yes_pool;
        market.no_pool = breakdown.new_no_pool;
        market.collected_fees = collected_fees;
        market.trade_count += 1;
        self.ledger.apply_fill(&mut market, fill);
        self.store.record_trade(amount, now);

        self.events.emit(MarketEvent::BetPlaced {
            id: market_id,
            user,
            is_yes,
            amount,
            shares: breakdown.shares,
        });
        info!(
            "Bet on market {}: user={} side={} amount={} shares={}",
            market_id,
            user.short(),
            if is_yes { "YES" } else { "NO" },
            amount,
            breakdown.shares
        );

        Ok(BetReceipt {
            market_id,
            shares: breakdown.shares,
            fee: breakdown.fee,
            net_amount: breakdown.net_amount,
        })
    }

    /// Transition an expired active market to Closed
    ///
    /// Side-effect-free in every other case; returns whether a transition
    /// happened.
    pub fn close_if_expired(&self, market_id: MarketId) -> Result<bool, EngineError> {
        let entry = self.market_entry(market_id)?;
        let mut market = entry.write();

        if market.status == MarketStatus::Active && self.clock.now_secs() >= market.close_time {
            market.status = MarketStatus::Closed;
            info!("Closed market {} at its close time", market_id);
            return Ok(true);
        }
        Ok(false)
    }

    /// Resolve a market to its final outcome (admin only)
    ///
    /// Freezes pools and share totals; the floor-division remainder of the
    /// future payouts is swept to the fee accumulator here, while positions
    /// are already immutable.
    pub fn resolve_market(
        &self,
        caller: AccountId,
        market_id: MarketId,
        outcome: Outcome,
    ) -> Result<(), EngineError> {
        self.require_admin(caller)?;
        if outcome == Outcome::Unset {
            return Err(EngineError::InvalidAmount(
                "resolution outcome must be yes or no".to_string(),
            ));
        }

        let entry = self.market_entry(market_id)?;
        let mut market = entry.write();

        if market.status.is_terminal() {
            return Err(EngineError::InvalidState(format!(
                "market {} is already settled",
                market_id
            )));
        }
        if self.clock.now_secs() < market.close_time {
            return Err(EngineError::InvalidState(format!(
                "market {} cannot resolve before its close time",
                market_id
            )));
        }

        let positions = self.store.positions_for(market_id);
        let dust = payout::resolution_dust(&market, outcome, &positions)?;
        self.fees.credit(dust)?;

        market.status = MarketStatus::Resolved;
        market.outcome = outcome;

        self.events.emit(MarketEvent::MarketResolved {
            id: market_id,
            outcome,
        });
        info!(
            "Resolved market {} as {:?}, payout dust {} swept to fees",
            market_id, outcome, dust
        );
        Ok(())
    }

    /// Cancel an untraded market (admin only)
    pub fn cancel_market(
        &self,
        caller: AccountId,
        market_id: MarketId,
    ) -> Result<(), EngineError> {
        self.require_admin(caller)?;

        let entry = self.market_entry(market_id)?;
        let mut market = entry.write();

        if market.status != MarketStatus::Active {
            return Err(EngineError::InvalidState(format!(
                "market {} is not active",
                market_id
            )));
        }
        if market.has_trades()
            || !market.total_yes_shares.is_zero()
            || !market.total_no_shares.is_zero()
        {
            return Err(EngineError::MarketHasTrades { market_id });
        }

        market.status = MarketStatus::Cancelled;

        self.events
            .emit(MarketEvent::MarketCancelled { id: market_id });
        info!("Cancelled market {}", market_id);
        Ok(())
    }

    /// Claim the payout or refund owed to an account, exactly once
    pub fn claim(
        &self,
        user: AccountId,
        market_id: MarketId,
    ) -> Result<TokenFixedPoint8, EngineError> {
        let entry = self.market_entry(market_id)?;
        let market = entry.write();

        if !market.status.is_terminal() {
            return Err(EngineError::InvalidState(format!(
                "market {} is not resolved or cancelled",
                market_id
            )));
        }

        let position = match self.ledger.get(market_id, user) {
            Some(position) => position,
            // A cancelled market's creator claims the seed back without
            // ever having traded
            None if market.status == MarketStatus::Cancelled && user == market.creator => {
                Position::default()
            }
            None => {
                return Err(EngineError::NotFound(format!(
                    "no position for {} in market {}",
                    user, market_id
                )))
            }
        };
        if position.claimed {
            return Err(EngineError::AlreadyClaimed { market_id });
        }

        let amount = payout::claim_amount(&market, user, &position)?;
        self.ledger.mark_claimed(market_id, user);

        self.events.emit(MarketEvent::RewardClaimed {
            id: market_id,
            user,
            amount,
        });
        info!(
            "Claim on market {}: user={} amount={}",
            market_id,
            user.short(),
            amount
        );
        Ok(amount)
    }

    /// Drain the accumulated protocol fees (admin only)
    pub fn withdraw_fees(&self, caller: AccountId) -> Result<TokenFixedPoint8, EngineError> {
        self.require_admin(caller)?;
        let amount = self.fees.drain();
        info!("Withdrew {} in accumulated fees", amount);
        Ok(amount)
    }

    // ---- read operations -------------------------------------------------

    /// Point-in-time snapshot of a market
    pub fn market(&self, market_id: MarketId) -> Result<Market, EngineError> {
        self.store
            .snapshot(market_id)
            .ok_or_else(|| Self::unknown_market(market_id))
    }

    /// Exact rational prices for a market
    pub fn prices(&self, market_id: MarketId) -> Result<PricePair, EngineError> {
        let market = self.market(market_id)?;
        let pools = BinaryPoolState::new(market.yes_pool, market.no_pool);
        Ok(CpmmMath::price(&pools)?)
    }

    /// An account's position; empty if the account never traded the market
    pub fn position(
        &self,
        market_id: MarketId,
        user: AccountId,
    ) -> Result<Position, EngineError> {
        if self.store.market(market_id).is_none() {
            return Err(Self::unknown_market(market_id));
        }
        Ok(self.ledger.get(market_id, user).unwrap_or_default())
    }

    /// Quote the payout a bet would earn if its side wins
    pub fn potential_payout(
        &self,
        market_id: MarketId,
        amount: TokenFixedPoint8,
        is_yes: bool,
    ) -> Result<TokenFixedPoint8, EngineError> {
        let market = self.market(market_id)?;
        if market.status != MarketStatus::Active {
            return Err(EngineError::InvalidState(format!(
                "market {} is not active",
                market_id
            )));
        }
        let side = Side::from_is_yes(is_yes);
        let pools = BinaryPoolState::new(market.yes_pool, market.no_pool);
        Ok(CpmmMath::potential_payout(
            &pools,
            market.total_shares(side),
            amount,
            side,
            self.config.fee_bps,
        )?)
    }

    /// Number of markets ever created
    pub fn market_count(&self) -> usize {
        self.store.market_count()
    }

    /// All market ids in ascending order
    pub fn market_ids(&self) -> Vec<MarketId> {
        self.store.market_ids()
    }

    /// Current owner-withdrawable fee balance
    pub fn collected_fees(&self) -> TokenFixedPoint8 {
        self.fees.balance()
    }

    /// Register a live event consumer
    pub fn subscribe(&self) -> Receiver<MarketEvent> {
        self.events.subscribe()
    }

    /// Full event log in emission order
    pub fn events(&self) -> Vec<MarketEvent> {
        self.events.events()
    }

    /// Events for one market, in commit order
    pub fn events_for(&self, market_id: MarketId) -> Vec<MarketEvent> {
        self.events.events_for(market_id)
    }

    /// Engine-wide running totals
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- internals -------------------------------------------------------

    fn market_entry(&self, market_id: MarketId) -> Result<Arc<RwLock<Market>>, EngineError> {
        self.store
            .market(market_id)
            .ok_or_else(|| Self::unknown_market(market_id))
    }

    fn unknown_market(market_id: MarketId) -> EngineError {
        EngineError::NotFound(format!("unknown market {}", market_id))
    }

    fn require_admin(&self, caller: AccountId) -> Result<(), EngineError> {
        if caller != self.config.admin {
            warn!("Rejected admin operation from {}", caller.short());
            return Err(EngineError::Unauthorized(format!(
                "account {} lacks the admin role",
                caller
            )));
        }
        Ok(())
    }
}
