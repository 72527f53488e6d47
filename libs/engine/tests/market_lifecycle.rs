//! End-to-end lifecycle tests for the market engine
//!
//! Drives the full create/bet/close/resolve/cancel/claim surface through
//! the public API on a manual clock, checking the ledger invariants the
//! engine promises at every observable point.

use std::sync::Arc;

use market_engine::{EngineConfig, EngineError, ManualClock, MarketEngine};
use market_types::{AccountId, MarketEvent, MarketId, MarketStatus, Outcome, TokenFixedPoint8};

const START_SECS: u64 = 1_700_000_000;
const DAY_SECS: u64 = 86_400;

fn admin() -> AccountId {
    AccountId([0xAA; 20])
}

fn account(tag: u8) -> AccountId {
    AccountId([tag; 20])
}

fn tokens(n: u64) -> TokenFixedPoint8 {
    TokenFixedPoint8::from_tokens(n)
}

fn engine_with_fee(fee_bps: u32) -> (MarketEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_SECS));
    let engine =
        MarketEngine::with_clock(EngineConfig::new(admin(), fee_bps), clock.clone()).unwrap();
    (engine, clock)
}

fn even_market(engine: &MarketEngine, creator: AccountId) -> MarketId {
    engine
        .create_market(creator, "Will it settle YES?", "", DAY_SECS, tokens(10), 5_000)
        .unwrap()
}

/// Σ position shares must equal the market totals on both sides
fn assert_share_sums(engine: &MarketEngine, id: MarketId, users: &[AccountId]) {
    let market = engine.market(id).unwrap();
    let mut yes_sum = TokenFixedPoint8::ZERO;
    let mut no_sum = TokenFixedPoint8::ZERO;
    for user in users {
        let position = engine.position(id, *user).unwrap();
        yes_sum = yes_sum.checked_add(position.yes_shares).unwrap();
        no_sum = no_sum.checked_add(position.no_shares).unwrap();
    }
    assert_eq!(yes_sum, market.total_yes_shares);
    assert_eq!(no_sum, market.total_no_shares);
}

#[test]
fn even_seed_splits_into_equal_pools() {
    let (engine, _) = engine_with_fee(0);
    let id = even_market(&engine, account(0x01));

    let market = engine.market(id).unwrap();
    assert_eq!(market.yes_pool, tokens(5));
    assert_eq!(market.no_pool, tokens(5));
    assert_eq!(market.status, MarketStatus::Active);
    assert_eq!(market.seed_fund, tokens(10));
    assert_eq!(market.close_time, START_SECS + DAY_SECS);

    let prices = engine.prices(id).unwrap();
    assert_eq!(prices.yes_numerator, tokens(5));
    assert_eq!(prices.denominator, tokens(10));
}

#[test]
fn fee_free_bet_follows_constant_product() {
    // seed=10 at 50/50, then 5 on YES with no fee: k=25 pre-trade,
    // yes pool 10, no pool 25/10 = 2.5, shares = 5 - 2.5 = 2.5
    let (engine, _) = engine_with_fee(0);
    let alice = account(0x01);
    let id = even_market(&engine, alice);

    let receipt = engine.place_bet(alice, id, true, tokens(5)).unwrap();
    assert_eq!(receipt.fee, TokenFixedPoint8::ZERO);
    assert_eq!(receipt.shares, TokenFixedPoint8::from_raw(250_000_000));

    let market = engine.market(id).unwrap();
    assert_eq!(market.yes_pool, tokens(10));
    assert_eq!(market.no_pool, TokenFixedPoint8::from_raw(250_000_000));
    assert_eq!(market.total_yes_shares, receipt.shares);
    assert_eq!(market.trade_count, 1);

    let position = engine.position(id, alice).unwrap();
    assert_eq!(position.yes_shares, receipt.shares);
    assert_eq!(position.yes_cost, tokens(5));
    assert_share_sums(&engine, id, &[alice]);
}

#[test]
fn pools_stay_positive_under_heavy_one_sided_betting() {
    let (engine, _) = engine_with_fee(100);
    let alice = account(0x01);
    let id = even_market(&engine, alice);

    for _ in 0..200 {
        engine.place_bet(alice, id, true, tokens(50)).unwrap();
    }

    let market = engine.market(id).unwrap();
    assert!(!market.yes_pool.is_zero());
    assert!(!market.no_pool.is_zero());
    assert_share_sums(&engine, id, &[alice]);
}

#[test]
fn bet_boundaries_are_rejected() {
    let (engine, clock) = engine_with_fee(0);
    let alice = account(0x01);
    let id = even_market(&engine, alice);

    assert!(matches!(
        engine.place_bet(alice, id, true, TokenFixedPoint8::ZERO),
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine.place_bet(alice, MarketId::new(404), true, tokens(1)),
        Err(EngineError::NotFound(_))
    ));

    clock.advance(DAY_SECS);
    assert!(matches!(
        engine.place_bet(alice, id, true, tokens(1)),
        Err(EngineError::InvalidState(_))
    ));

    // Nothing committed by any rejected bet
    let market = engine.market(id).unwrap();
    assert_eq!(market.trade_count, 0);
    assert_eq!(market.yes_pool, tokens(5));
}

#[test]
fn create_market_basis_point_boundaries() {
    let (engine, _) = engine_with_fee(0);
    let creator = account(0x01);

    for bad_bp in [0u32, 10_000] {
        assert!(matches!(
            engine.create_market(creator, "q", "", DAY_SECS, tokens(10), bad_bp),
            Err(EngineError::InvalidAmount(_))
        ));
    }
    assert!(engine
        .create_market(creator, "q", "", DAY_SECS, tokens(10), 1)
        .is_ok());
    assert!(engine
        .create_market(creator, "q", "", DAY_SECS, tokens(10), 9_999)
        .is_ok());
}

#[test]
fn close_if_expired_is_exactly_once_effectful() {
    let (engine, clock) = engine_with_fee(0);
    let id = even_market(&engine, account(0x01));

    assert!(!engine.close_if_expired(id).unwrap());
    assert_eq!(engine.market(id).unwrap().status, MarketStatus::Active);

    clock.advance(DAY_SECS);
    assert!(engine.close_if_expired(id).unwrap());
    assert_eq!(engine.market(id).unwrap().status, MarketStatus::Closed);

    // Repeat call is a no-op, not an error
    assert!(!engine.close_if_expired(id).unwrap());
}

#[test]
fn cancel_only_while_untraded() {
    let (engine, _) = engine_with_fee(0);
    let creator = account(0x01);

    let untraded = even_market(&engine, creator);
    engine.cancel_market(admin(), untraded).unwrap();
    assert_eq!(
        engine.market(untraded).unwrap().status,
        MarketStatus::Cancelled
    );

    let traded = even_market(&engine, creator);
    engine.place_bet(creator, traded, false, tokens(1)).unwrap();
    assert_eq!(
        engine.cancel_market(admin(), traded),
        Err(EngineError::MarketHasTrades { market_id: traded })
    );
    assert_eq!(engine.market(traded).unwrap().status, MarketStatus::Active);
}

#[test]
fn cancelled_market_refunds_creator_seed() {
    let (engine, _) = engine_with_fee(0);
    let creator = account(0x01);
    let id = even_market(&engine, creator);

    engine.cancel_market(admin(), id).unwrap();

    // Frozen pools survive cancellation; only claims proceed
    let market = engine.market(id).unwrap();
    assert_eq!(market.pool_total().unwrap(), tokens(10));

    let refund = engine.claim(creator, id).unwrap();
    assert_eq!(refund, tokens(10));
    assert_eq!(
        engine.claim(creator, id),
        Err(EngineError::AlreadyClaimed { market_id: id })
    );

    // An account that never participated has nothing to claim
    assert!(matches!(
        engine.claim(account(0x09), id),
        Err(EngineError::NotFound(_))
    ));
}

#[test]
fn resolve_requires_admin_closure_and_outcome() {
    let (engine, clock) = engine_with_fee(0);
    let alice = account(0x01);
    let id = even_market(&engine, alice);

    assert!(matches!(
        engine.resolve_market(alice, id, Outcome::Yes),
        Err(EngineError::Unauthorized(_))
    ));
    assert!(matches!(
        engine.resolve_market(admin(), id, Outcome::Yes),
        Err(EngineError::InvalidState(_))
    ));
    assert!(matches!(
        engine.resolve_market(admin(), id, Outcome::Unset),
        Err(EngineError::InvalidAmount(_))
    ));

    clock.advance(DAY_SECS);
    engine.close_if_expired(id).unwrap();
    engine.resolve_market(admin(), id, Outcome::Yes).unwrap();

    let market = engine.market(id).unwrap();
    assert_eq!(market.status, MarketStatus::Resolved);
    assert_eq!(market.outcome, Outcome::Yes);

    // Terminal states are final
    assert!(matches!(
        engine.resolve_market(admin(), id, Outcome::No),
        Err(EngineError::InvalidState(_))
    ));
}

#[test]
fn winner_takes_pool_loser_takes_zero() {
    let (engine, clock) = engine_with_fee(0);
    let alice = account(0x01);
    let bob = account(0x02);
    let id = even_market(&engine, account(0x03));

    engine.place_bet(alice, id, true, tokens(5)).unwrap();
    engine.place_bet(bob, id, false, tokens(2)).unwrap();

    clock.advance(DAY_SECS);
    engine.resolve_market(admin(), id, Outcome::Yes).unwrap();
    let pool_total = engine.market(id).unwrap().pool_total().unwrap();

    // Bob holds only NO shares: zero payout, but the claim still commits
    assert_eq!(engine.claim(bob, id).unwrap(), TokenFixedPoint8::ZERO);
    assert_eq!(
        engine.claim(bob, id),
        Err(EngineError::AlreadyClaimed { market_id: id })
    );

    // Alice holds every YES share: the whole pool, exactly (no fee, sole
    // winner, so floor division has no remainder)
    assert_eq!(engine.claim(alice, id).unwrap(), pool_total);
    assert!(engine.collected_fees().is_zero());
}

#[test]
fn conservation_holds_with_fees_and_dust() {
    let (engine, clock) = engine_with_fee(100);
    let users = [account(0x01), account(0x02), account(0x03), account(0x04)];
    let id = even_market(&engine, account(0x0F));

    let mut trade_fees = TokenFixedPoint8::ZERO;
    let bets: [(usize, bool, u64); 5] = [
        (0, true, 5),
        (1, true, 3),
        (2, false, 4),
        (3, true, 7),
        (2, false, 2),
    ];
    for (user, is_yes, amount) in bets {
        let receipt = engine
            .place_bet(users[user], id, is_yes, tokens(amount))
            .unwrap();
        trade_fees = trade_fees.checked_add(receipt.fee).unwrap();
    }
    assert_share_sums(&engine, id, &users);
    assert_eq!(engine.collected_fees(), trade_fees);

    clock.advance(DAY_SECS);
    engine.resolve_market(admin(), id, Outcome::Yes).unwrap();

    let market = engine.market(id).unwrap();
    let pool_total = market.pool_total().unwrap();
    let winning_total = market.total_yes_shares;
    let dust = engine.collected_fees().checked_sub(trade_fees).unwrap();

    let mut paid_out = TokenFixedPoint8::ZERO;
    for user in users {
        let position = engine.position(id, user).unwrap();
        let payout = engine.claim(user, id).unwrap();
        paid_out = paid_out.checked_add(payout).unwrap();

        // Each payout is the floored pro-rata share: within one raw unit of
        // the exact rational entitlement
        let exact_numerator =
            position.yes_shares.raw_u128() * pool_total.raw_u128();
        let floored = payout.raw_u128() * winning_total.raw_u128();
        assert!(floored <= exact_numerator);
        assert!(exact_numerator - floored < winning_total.raw_u128());
    }

    // Σ payouts + dust reconstructs the frozen pool exactly
    assert_eq!(paid_out.checked_add(dust).unwrap(), pool_total);

    // And the admin can drain everything the protocol earned
    let withdrawn = engine.withdraw_fees(admin()).unwrap();
    assert_eq!(withdrawn, trade_fees.checked_add(dust).unwrap());
    assert!(engine.collected_fees().is_zero());
}

#[test]
fn resolution_with_no_winners_sweeps_pool_to_fees() {
    let (engine, clock) = engine_with_fee(0);
    let bob = account(0x02);
    let id = even_market(&engine, account(0x01));

    engine.place_bet(bob, id, false, tokens(2)).unwrap();
    clock.advance(DAY_SECS);

    let pool_total = engine.market(id).unwrap().pool_total().unwrap();
    engine.resolve_market(admin(), id, Outcome::Yes).unwrap();

    assert_eq!(engine.collected_fees(), pool_total);
    assert_eq!(engine.claim(bob, id).unwrap(), TokenFixedPoint8::ZERO);
}

#[test]
fn potential_payout_quote_matches_realized_claim() {
    let (engine, clock) = engine_with_fee(100);
    let alice = account(0x01);
    let id = even_market(&engine, account(0x03));

    let quote = engine.potential_payout(id, tokens(5), true).unwrap();
    engine.place_bet(alice, id, true, tokens(5)).unwrap();

    clock.advance(DAY_SECS);
    engine.resolve_market(admin(), id, Outcome::Yes).unwrap();

    let realized = engine.claim(alice, id).unwrap();
    assert_eq!(quote, realized);
}

#[test]
fn per_market_event_stream_follows_commit_order() {
    let (engine, clock) = engine_with_fee(0);
    let alice = account(0x01);
    let rx = engine.subscribe();

    let id = even_market(&engine, alice);
    engine.place_bet(alice, id, true, tokens(5)).unwrap();
    clock.advance(DAY_SECS);
    engine.resolve_market(admin(), id, Outcome::Yes).unwrap();
    let amount = engine.claim(alice, id).unwrap();

    let expected = vec![
        MarketEvent::MarketCreated {
            id,
            question: "Will it settle YES?".to_string(),
            close_time: START_SECS + DAY_SECS,
            creator: alice,
            seed_fund: tokens(10),
        },
        MarketEvent::BetPlaced {
            id,
            user: alice,
            is_yes: true,
            amount: tokens(5),
            shares: TokenFixedPoint8::from_raw(250_000_000),
        },
        MarketEvent::MarketResolved {
            id,
            outcome: Outcome::Yes,
        },
        MarketEvent::RewardClaimed {
            id,
            user: alice,
            amount,
        },
    ];

    assert_eq!(engine.events_for(id), expected);
    for event in expected {
        assert_eq!(rx.recv().unwrap(), event);
    }
    assert!(rx.try_recv().is_err());
}

#[test]
fn markets_trade_in_parallel_without_interference() {
    let (engine, _) = engine_with_fee(50);
    let engine = Arc::new(engine);

    let ids: Vec<MarketId> = (0..4)
        .map(|i| even_market(&engine, account(i as u8 + 1)))
        .collect();

    let mut handles = Vec::new();
    for (i, id) in ids.iter().enumerate() {
        let engine = engine.clone();
        let id = *id;
        let user = account(0x10 + i as u8);
        handles.push(std::thread::spawn(move || {
            for round in 0..50 {
                engine
                    .place_bet(user, id, round % 2 == 0, tokens(1))
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    for (i, id) in ids.iter().enumerate() {
        let market = engine.market(*id).unwrap();
        assert_eq!(market.trade_count, 50);
        assert!(!market.yes_pool.is_zero());
        assert!(!market.no_pool.is_zero());
        assert_share_sums(&engine, *id, &[account(0x10 + i as u8)]);
    }
    assert_eq!(engine.stats().total_trades, 200);
}

#[test]
fn market_ids_enumerate_in_creation_order() {
    let (engine, _) = engine_with_fee(0);
    let creator = account(0x01);

    let first = even_market(&engine, creator);
    let second = even_market(&engine, creator);

    assert_eq!(engine.market_count(), 2);
    assert_eq!(engine.market_ids(), vec![first, second]);
    assert!(first < second);
}
