//! End-to-end integration tests for the reverse auction system.
//!
//! These tests exercise the full auction lifecycle through the engine:
//! 1. Creation with locked funds
//! 2. Whitelisting
//! 3. Bid submission and escrow
//! 4. Finalization or cancellation
//! 5. Balance accounting on the ledger

use std::sync::Arc;

use reverse_auction_module::{
    AuctionCall, AuctionEngine, AuctionError, AuctionQuery, AuctionQueryResponse, CallOutcome,
    EngineConfig, EventSink, InMemoryLedger, Ledger, LedgerError, RecordingSink,
};
use reverse_auction_types::{
    ether, Address, Amount, AuctionEvent, AuctionParams, AuctionStatus, DuplicateBidPolicy,
    PayoutRule, Transfer, WhitelistMode,
};

const CREATOR: Address = [0xc0; 32];
const BIDDER_1: Address = [1u8; 32];
const BIDDER_2: Address = [2u8; 32];
const BIDDER_3: Address = [3u8; 32];
const OUTSIDER: Address = [0xee; 32];

const N: u32 = 2;
const DURATION: u64 = 60;
const START: u64 = 1_700_000_000;

fn max_bid() -> Amount {
    ether(5)
}

fn funded_ledger() -> InMemoryLedger {
    let mut ledger = InMemoryLedger::new(START);
    for who in [CREATOR, BIDDER_1, BIDDER_2, BIDDER_3, OUTSIDER] {
        ledger.fund(who, ether(100)).unwrap();
    }
    ledger
}

fn new_auction(config: EngineConfig) -> AuctionEngine<InMemoryLedger, RecordingSink> {
    let engine = AuctionEngine::new(config, funded_ledger(), RecordingSink::new()).unwrap();
    engine
        .create(
            CREATOR,
            AuctionParams::new(N, max_bid(), DURATION),
            ether(10),
        )
        .unwrap();
    engine
}

fn balance<E: EventSink>(engine: &AuctionEngine<InMemoryLedger, E>, who: &Address) -> Amount {
    engine.with_ledger(|ledger| ledger.balance_of(who))
}

fn advance_past_deadline<E: EventSink>(engine: &AuctionEngine<InMemoryLedger, E>) {
    engine.with_ledger(|ledger| ledger.advance_time(DURATION + 60));
}

/// Ledger that can be told to reject payout batches.
struct FlakyLedger {
    inner: InMemoryLedger,
    reject_batches: bool,
}

impl Ledger for FlakyLedger {
    fn now(&self) -> u64 {
        self.inner.now()
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.inner.balance_of(account)
    }

    fn collect(&mut self, from: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.inner.collect(from, amount)
    }

    fn transfer_batch(&mut self, transfers: &[Transfer]) -> Result<(), LedgerError> {
        if self.reject_batches {
            return Err(LedgerError::Rejected("payouts paused".into()));
        }
        self.inner.transfer_batch(transfers)
    }
}

// ========================================
// Initialization
// ========================================

#[test]
fn test_initializes_correctly() {
    let engine = new_auction(EngineConfig::default());

    let auction = engine.auction().unwrap();
    assert_eq!(auction.creator, CREATOR);
    assert_eq!(engine.max_bid(), Some(ether(5)));
    assert_eq!(engine.winner_count(), Some(N));
    assert_eq!(engine.locked_amount(), Some(ether(10)));
    assert_eq!(engine.end_time(), Some(START + DURATION));
    assert_eq!(engine.status(), Some(AuctionStatus::Open));
    assert_eq!(engine.escrow_balance(), ether(10));
    assert_eq!(balance(&engine, &CREATOR), ether(90));
}

#[test]
fn test_create_rejects_wrong_locked_value() {
    let engine =
        AuctionEngine::new(EngineConfig::default(), funded_ledger(), RecordingSink::new()).unwrap();

    for value in [ether(9), ether(11), 0] {
        let result = engine.create(CREATOR, AuctionParams::new(N, max_bid(), DURATION), value);
        assert!(matches!(result, Err(AuctionError::InvalidParameters(_))));
    }
    assert!(engine.status().is_none());
    assert_eq!(balance(&engine, &CREATOR), ether(100));
}

#[test]
fn test_create_rejects_degenerate_parameters() {
    let engine =
        AuctionEngine::new(EngineConfig::default(), funded_ledger(), RecordingSink::new()).unwrap();

    let cases = [
        AuctionParams::new(0, max_bid(), DURATION),
        AuctionParams::new(N, 0, DURATION),
        AuctionParams::new(N, max_bid(), 0),
    ];
    for params in cases {
        let value = params.required_lock().unwrap();
        assert!(matches!(
            engine.create(CREATOR, params, value),
            Err(AuctionError::InvalidParameters(_))
        ));
    }
}

// ========================================
// Whitelist
// ========================================

#[test]
fn test_allows_whitelisting() {
    let engine = new_auction(EngineConfig::default());

    assert_eq!(engine.whitelist_address(CREATOR, BIDDER_1), Ok(true));
    assert!(engine.is_whitelisted(&BIDDER_1));
    assert!(!engine.is_whitelisted(&BIDDER_2));

    // Idempotent
    assert_eq!(engine.whitelist_address(CREATOR, BIDDER_1), Ok(false));
    assert_eq!(
        engine.query(AuctionQuery::GetWhitelist),
        AuctionQueryResponse::Whitelist(vec![BIDDER_1])
    );
}

#[test]
fn test_whitelisting_requires_creator() {
    let engine = new_auction(EngineConfig::default());
    assert_eq!(
        engine.whitelist_address(BIDDER_1, BIDDER_1),
        Err(AuctionError::Unauthorized { caller: BIDDER_1 })
    );
    assert!(!engine.is_whitelisted(&BIDDER_1));
}

#[test]
fn test_empty_whitelist_is_open_to_all() {
    let engine = new_auction(EngineConfig::default());
    assert!(engine.bid(OUTSIDER, ether(1)).is_ok());
}

#[test]
fn test_populated_whitelist_restricts_bidders() {
    let engine = new_auction(EngineConfig::default());
    engine.whitelist_address(CREATOR, BIDDER_1).unwrap();

    assert!(engine.bid(BIDDER_1, ether(1)).is_ok());
    assert_eq!(
        engine.bid(OUTSIDER, ether(1)),
        Err(AuctionError::NotWhitelisted { bidder: OUTSIDER })
    );
    assert_eq!(engine.bids().len(), 1);
}

#[test]
fn test_strict_whitelist_with_no_members_rejects_everyone() {
    let engine =
        new_auction(EngineConfig::default().with_whitelist_mode(WhitelistMode::Strict));

    assert_eq!(
        engine.bid(BIDDER_1, ether(1)),
        Err(AuctionError::NotWhitelisted { bidder: BIDDER_1 })
    );

    engine.whitelist_address(CREATOR, BIDDER_1).unwrap();
    assert!(engine.bid(BIDDER_1, ether(1)).is_ok());
}

#[test]
fn test_removing_last_member_reopens_lenient_whitelist() {
    let engine = new_auction(EngineConfig::default());
    engine.whitelist_address(CREATOR, BIDDER_1).unwrap();
    assert!(engine.bid(OUTSIDER, ether(1)).is_err());

    assert_eq!(engine.remove_from_whitelist(CREATOR, BIDDER_1), Ok(true));
    assert!(engine.bid(OUTSIDER, ether(1)).is_ok());
}

// ========================================
// Bidding
// ========================================

#[test]
fn test_accepts_valid_bids() {
    let engine = new_auction(EngineConfig::default());
    engine.bid(BIDDER_1, ether(3)).unwrap();

    let bids = engine.bids();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].bidder, BIDDER_1);
    assert_eq!(bids[0].amount, ether(3));
    assert_eq!(balance(&engine, &BIDDER_1), ether(97));
    assert_eq!(engine.escrow_balance(), ether(13));
}

#[test]
fn test_rejects_bids_above_maximum() {
    let engine = new_auction(EngineConfig::default());

    let result = engine.bid(BIDDER_1, ether(6));
    assert_eq!(
        result,
        Err(AuctionError::BidTooHigh {
            amount: ether(6),
            max_bid: ether(5)
        })
    );
    assert!(result.unwrap_err().to_string().contains("Bid exceeds maximum amount"));
    assert!(engine.bids().is_empty());
    assert_eq!(balance(&engine, &BIDDER_1), ether(100));
    assert_eq!(engine.escrow_balance(), ether(10));
}

#[test]
fn test_prevents_bids_after_deadline() {
    let engine = new_auction(EngineConfig::default());
    advance_past_deadline(&engine);

    let err = engine.bid(BIDDER_1, ether(3)).unwrap_err();
    assert!(matches!(err, AuctionError::AuctionClosed { .. }));
    assert!(err.to_string().contains("Auction already ended"));
    assert!(engine.bids().is_empty());
}

#[test]
fn test_bid_exactly_at_deadline_is_closed() {
    let engine = new_auction(EngineConfig::default());
    engine.with_ledger(|ledger| ledger.set_timestamp(START + DURATION - 1));
    assert!(engine.bid(BIDDER_1, ether(1)).is_ok());

    engine.with_ledger(|ledger| ledger.set_timestamp(START + DURATION));
    assert!(matches!(
        engine.bid(BIDDER_2, ether(1)),
        Err(AuctionError::AuctionClosed { .. })
    ));
}

#[test]
fn test_creator_without_funds_cannot_create() {
    let engine =
        AuctionEngine::new(EngineConfig::default(), funded_ledger(), RecordingSink::new()).unwrap();
    let result = engine.create(CREATOR, AuctionParams::new(1, ether(500), DURATION), ether(500));
    assert!(matches!(
        result,
        Err(AuctionError::TransferFailed(LedgerError::InsufficientFunds { .. }))
    ));
    assert!(engine.status().is_none());
    assert_eq!(balance(&engine, &CREATOR), ether(100));
}

#[test]
fn test_bid_without_funds_changes_nothing() {
    let engine = new_auction(EngineConfig::default());
    let broke: Address = [0x42; 32];
    assert!(matches!(
        engine.bid(broke, ether(1)),
        Err(AuctionError::TransferFailed(LedgerError::InsufficientFunds { .. }))
    ));
    assert!(engine.bids().is_empty());
}

#[test]
fn test_duplicate_bids_allowed_by_default() {
    let engine = new_auction(EngineConfig::default());
    engine.bid(BIDDER_1, ether(1)).unwrap();
    engine.bid(BIDDER_1, ether(2)).unwrap();
    engine.bid(BIDDER_2, ether(4)).unwrap();
    advance_past_deadline(&engine);

    let report = engine.end_auction(CREATOR).unwrap();
    assert_eq!(report.winner_addresses(), vec![BIDDER_1, BIDDER_1]);

    // Both refunds net into one transfer.
    let to_bidder_1: Vec<_> = report.transfers.iter().filter(|t| t.to == BIDDER_1).collect();
    assert_eq!(to_bidder_1.len(), 1);
    assert_eq!(to_bidder_1[0].amount, ether(3));
    assert_eq!(balance(&engine, &BIDDER_1), ether(100));
    assert_eq!(balance(&engine, &BIDDER_2), ether(100));
}

#[test]
fn test_duplicate_bids_rejected_by_policy() {
    let engine =
        new_auction(EngineConfig::default().with_duplicate_bids(DuplicateBidPolicy::Reject));
    engine.bid(BIDDER_1, ether(1)).unwrap();

    assert_eq!(
        engine.bid(BIDDER_1, ether(2)),
        Err(AuctionError::DuplicateBid { bidder: BIDDER_1 })
    );
    assert_eq!(engine.bids().len(), 1);
    assert_eq!(balance(&engine, &BIDDER_1), ether(99));
}

// ========================================
// Finalization
// ========================================

#[test]
fn test_sorts_bids_on_end_auction() {
    let engine = new_auction(EngineConfig::default());
    engine.bid(BIDDER_1, ether(3)).unwrap();
    engine.bid(BIDDER_2, ether(2)).unwrap();
    engine.bid(BIDDER_3, ether(1)).unwrap();

    advance_past_deadline(&engine);
    let creator_before = balance(&engine, &CREATOR);
    let held = engine.escrow_balance();

    let report = engine.end_auction(CREATOR).unwrap();

    let announced = engine.with_sink(|sink| sink.announced_winners());
    assert_eq!(announced, vec![vec![BIDDER_3, BIDDER_2]]);
    assert_eq!(report.winner_addresses(), vec![BIDDER_3, BIDDER_2]);

    // Winners and loser alike get exactly their bid back.
    for bidder in [BIDDER_1, BIDDER_2, BIDDER_3] {
        assert_eq!(balance(&engine, &bidder), ether(100));
    }
    assert_eq!(report.received_by(&BIDDER_1), ether(3));
    assert_eq!(report.received_by(&BIDDER_3), ether(1));

    // Creator delta is whatever was held minus everything paid to bidders.
    let paid_to_bidders: Amount = [BIDDER_1, BIDDER_2, BIDDER_3]
        .iter()
        .map(|b| report.received_by(b))
        .sum();
    let creator_delta = balance(&engine, &CREATOR) - creator_before;
    assert_eq!(creator_delta, held - paid_to_bidders);
    assert_eq!(creator_delta, ether(10));

    assert_eq!(engine.status(), Some(AuctionStatus::Ended));
    assert_eq!(engine.escrow_balance(), 0);
    engine.with_ledger(|ledger| assert_eq!(ledger.custody(), 0));
}

#[test]
fn test_refunds_remaining_locked_funds_to_creator() {
    let engine = new_auction(EngineConfig::default().with_payout_rule(PayoutRule::OwnBid));
    engine.bid(BIDDER_1, ether(3)).unwrap();
    engine.bid(BIDDER_2, ether(2)).unwrap();

    let creator_before = balance(&engine, &CREATOR);
    advance_past_deadline(&engine);
    let report = engine.end_auction(CREATOR).unwrap();

    assert!(balance(&engine, &CREATOR) > creator_before);
    assert_eq!(report.creator_remainder, ether(5));
}

#[test]
fn test_no_bids_returns_full_lock() {
    let engine = new_auction(EngineConfig::default());
    advance_past_deadline(&engine);

    let report = engine.end_auction(CREATOR).unwrap();
    assert!(report.winners.is_empty());
    assert_eq!(balance(&engine, &CREATOR), ether(100));
    assert_eq!(
        engine.with_sink(|sink| sink.announced_winners()),
        vec![Vec::<Address>::new()]
    );
}

#[test]
fn test_end_auction_preconditions() {
    let engine = new_auction(EngineConfig::default());
    engine.bid(BIDDER_1, ether(3)).unwrap();

    assert_eq!(
        engine.end_auction(CREATOR),
        Err(AuctionError::TooEarly {
            now: START,
            end_time: START + DURATION
        })
    );

    advance_past_deadline(&engine);
    assert_eq!(
        engine.end_auction(BIDDER_1),
        Err(AuctionError::Unauthorized { caller: BIDDER_1 })
    );
    assert_eq!(engine.status(), Some(AuctionStatus::Open));
}

#[test]
fn test_payout_rules() {
    // (rule, creator remainder, gain of the 1 ether winner)
    let cases = [
        (PayoutRule::RefundOnly, ether(10), 0),
        (PayoutRule::OwnBid, ether(7), ether(1)),
        // Both winners paid the 5 ether ceiling.
        (PayoutRule::Ceiling, 0, ether(5)),
        // Both winners paid the lowest losing bid, 3 ether.
        (PayoutRule::Clearing, ether(4), ether(3)),
    ];

    for (rule, expected_remainder, winner_gain) in cases {
        let engine = new_auction(EngineConfig::default().with_payout_rule(rule));
        engine.bid(BIDDER_1, ether(3)).unwrap();
        engine.bid(BIDDER_2, ether(2)).unwrap();
        engine.bid(BIDDER_3, ether(1)).unwrap();
        advance_past_deadline(&engine);

        let report = engine.end_auction(CREATOR).unwrap();
        assert_eq!(report.payout_rule, rule);
        assert_eq!(report.creator_remainder, expected_remainder, "{rule:?}");
        assert_eq!(
            balance(&engine, &CREATOR),
            ether(90) + expected_remainder,
            "{rule:?}"
        );
        assert_eq!(engine.escrow_balance(), 0);
        assert_eq!(balance(&engine, &BIDDER_1), ether(100), "{rule:?}");
        assert_eq!(
            balance(&engine, &BIDDER_3),
            ether(100) + winner_gain,
            "{rule:?}"
        );
    }
}

#[test]
fn test_default_payout_is_refund_only() {
    assert_eq!(EngineConfig::default().payout_rule, PayoutRule::RefundOnly);
}

// ========================================
// Cancellation
// ========================================

#[test]
fn test_allows_auction_cancellation() {
    let engine = new_auction(EngineConfig::default());
    engine.bid(BIDDER_1, ether(3)).unwrap();
    engine.bid(BIDDER_2, ether(4)).unwrap();
    let bidder_1_before = balance(&engine, &BIDDER_1);

    let report = engine.cancel_auction(CREATOR).unwrap();

    assert_eq!(balance(&engine, &BIDDER_1) - bidder_1_before, ether(3));
    assert_eq!(balance(&engine, &BIDDER_2), ether(100));
    assert_eq!(balance(&engine, &CREATOR), ether(100));
    assert_eq!(report.status, AuctionStatus::Cancelled);
    assert_eq!(engine.status(), Some(AuctionStatus::Cancelled));
    assert_eq!(engine.escrow_balance(), 0);

    let events = engine.with_sink(|sink| sink.events().to_vec());
    assert_eq!(
        events.last(),
        Some(&AuctionEvent::AuctionCancelled {
            refunded_bids: 2,
            returned_to_creator: ether(10)
        })
    );
}

#[test]
fn test_cancel_after_deadline_still_allowed() {
    let engine = new_auction(EngineConfig::default());
    engine.bid(BIDDER_1, ether(3)).unwrap();
    advance_past_deadline(&engine);
    assert!(engine.cancel_auction(CREATOR).is_ok());
    assert_eq!(balance(&engine, &BIDDER_1), ether(100));
}

#[test]
fn test_cancel_requires_creator() {
    let engine = new_auction(EngineConfig::default());
    assert_eq!(
        engine.cancel_auction(OUTSIDER),
        Err(AuctionError::Unauthorized { caller: OUTSIDER })
    );
    assert_eq!(engine.status(), Some(AuctionStatus::Open));
}

// ========================================
// Exactly-once finalization
// ========================================

#[test]
fn test_second_finalization_always_fails() {
    let engine = new_auction(EngineConfig::default());
    engine.bid(BIDDER_1, ether(3)).unwrap();
    advance_past_deadline(&engine);
    engine.end_auction(CREATOR).unwrap();

    let snapshot: Vec<Amount> = [CREATOR, BIDDER_1]
        .iter()
        .map(|who| balance(&engine, who))
        .collect();

    assert_eq!(
        engine.end_auction(CREATOR),
        Err(AuctionError::AlreadyFinalized {
            status: AuctionStatus::Ended
        })
    );
    assert_eq!(
        engine.cancel_auction(CREATOR),
        Err(AuctionError::AlreadyFinalized {
            status: AuctionStatus::Ended
        })
    );
    assert!(matches!(
        engine.bid(BIDDER_2, ether(1)),
        Err(AuctionError::AuctionClosed { .. })
    ));
    assert!(matches!(
        engine.whitelist_address(CREATOR, BIDDER_2),
        Err(AuctionError::AuctionClosed { .. })
    ));

    let after: Vec<Amount> = [CREATOR, BIDDER_1]
        .iter()
        .map(|who| balance(&engine, who))
        .collect();
    assert_eq!(snapshot, after);
    assert_eq!(engine.with_sink(|sink| sink.announced_winners()).len(), 1);
}

#[test]
fn test_cancel_then_end_fails() {
    let engine = new_auction(EngineConfig::default());
    engine.cancel_auction(CREATOR).unwrap();
    advance_past_deadline(&engine);
    assert_eq!(
        engine.end_auction(CREATOR),
        Err(AuctionError::AlreadyFinalized {
            status: AuctionStatus::Cancelled
        })
    );
    assert_eq!(
        engine.cancel_auction(CREATOR),
        Err(AuctionError::AlreadyFinalized {
            status: AuctionStatus::Cancelled
        })
    );
}

// ========================================
// Atomicity
// ========================================

#[test]
fn test_rejected_payout_batch_leaves_auction_open() {
    let ledger = FlakyLedger {
        inner: funded_ledger(),
        reject_batches: true,
    };
    let engine = AuctionEngine::new(EngineConfig::default(), ledger, RecordingSink::new()).unwrap();
    engine
        .create(CREATOR, AuctionParams::new(N, max_bid(), DURATION), ether(10))
        .unwrap();
    engine.bid(BIDDER_1, ether(3)).unwrap();
    engine.with_ledger(|ledger| ledger.inner.advance_time(DURATION));

    let result = engine.end_auction(CREATOR);
    assert!(matches!(
        result,
        Err(AuctionError::TransferFailed(LedgerError::Rejected(_)))
    ));
    assert_eq!(engine.status(), Some(AuctionStatus::Open));
    assert_eq!(engine.escrow_balance(), ether(13));
    assert!(engine.settlement().is_none());
    assert!(engine.with_sink(|sink| sink.announced_winners()).is_empty());

    assert!(engine.cancel_auction(CREATOR).is_err());
    assert_eq!(engine.status(), Some(AuctionStatus::Open));

    // Once the ledger accepts payouts again, settlement goes through once.
    engine.with_ledger(|ledger| ledger.reject_batches = false);
    let report = engine.end_auction(CREATOR).unwrap();
    assert_eq!(report.winner_addresses(), vec![BIDDER_1]);
    engine.with_ledger(|ledger| {
        assert_eq!(ledger.inner.custody(), 0);
        assert_eq!(ledger.balance_of(&BIDDER_1), ether(100));
    });
}

// ========================================
// Conservation and concurrency
// ========================================

#[test]
fn test_total_supply_is_conserved() {
    let engine = new_auction(EngineConfig::default().with_payout_rule(PayoutRule::Clearing));
    let supply = engine.with_ledger(|ledger| ledger.total_supply());
    assert!(supply.is_some());

    for (who, amount) in [(BIDDER_1, 4), (BIDDER_2, 5), (BIDDER_3, 1), (OUTSIDER, 2)] {
        engine.bid(who, ether(amount)).unwrap();
        assert_eq!(engine.with_ledger(|ledger| ledger.total_supply()), supply);
        assert_eq!(
            engine.with_ledger(|ledger| ledger.custody()),
            engine.escrow_balance()
        );
    }

    advance_past_deadline(&engine);
    engine.end_auction(CREATOR).unwrap();
    engine.with_ledger(|ledger| {
        assert_eq!(ledger.total_supply(), supply);
        assert_eq!(ledger.custody(), 0);
    });
}

#[test]
fn test_concurrent_bidders_are_serialized() {
    let config = EngineConfig::default();
    let mut ledger = InMemoryLedger::new(START);
    ledger.fund(CREATOR, ether(10)).unwrap();
    let bidders: Vec<Address> = (10u8..30).map(|i| [i; 32]).collect();
    for b in &bidders {
        ledger.fund(*b, ether(5)).unwrap();
    }

    let engine = Arc::new(AuctionEngine::new(config, ledger, RecordingSink::new()).unwrap());
    engine
        .create(CREATOR, AuctionParams::new(N, max_bid(), DURATION), ether(10))
        .unwrap();

    std::thread::scope(|scope| {
        for (i, bidder) in bidders.iter().enumerate() {
            let engine = Arc::clone(&engine);
            let amount = ether(1 + (i as u64 % 5));
            scope.spawn(move || engine.bid(*bidder, amount).unwrap());
        }
    });

    let bids = engine.bids();
    assert_eq!(bids.len(), bidders.len());
    let mut sequences: Vec<u64> = bids.iter().map(|b| b.sequence).collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (0..bidders.len() as u64).collect::<Vec<_>>());

    let total_bids: Amount = bids.iter().map(|b| b.amount).sum();
    assert_eq!(engine.escrow_balance(), ether(10) + total_bids);

    advance_past_deadline(&engine);
    let report = engine.end_auction(CREATOR).unwrap();
    assert_eq!(report.winners.len(), N as usize);
    assert!(report.winners.iter().all(|b| b.amount == ether(1)));
    assert_eq!(engine.escrow_balance(), 0);
}

// ========================================
// Call messages and queries
// ========================================

#[test]
fn test_borsh_encoded_calls() {
    let engine =
        AuctionEngine::new(EngineConfig::default(), funded_ledger(), RecordingSink::new()).unwrap();

    let script: Vec<(Address, Amount, AuctionCall)> = vec![
        (
            CREATOR,
            ether(10),
            AuctionCall::Create {
                params: AuctionParams::new(N, max_bid(), DURATION),
            },
        ),
        (CREATOR, 0, AuctionCall::WhitelistAddress { address: BIDDER_1 }),
        (BIDDER_1, ether(2), AuctionCall::Bid),
    ];

    for (caller, value, call) in script {
        let wire = borsh::to_vec(&call).unwrap();
        let decoded: AuctionCall = borsh::from_slice(&wire).unwrap();
        engine.dispatch(caller, value, decoded).unwrap();
    }

    advance_past_deadline(&engine);
    let outcome = engine.dispatch(CREATOR, 0, AuctionCall::EndAuction).unwrap();
    assert!(matches!(outcome, CallOutcome::Settled(ref r) if r.winners.len() == 1));
}

#[test]
fn test_query_surface() {
    let engine = new_auction(EngineConfig::default());
    engine.bid(BIDDER_1, ether(3)).unwrap();
    engine.bid(BIDDER_2, ether(2)).unwrap();
    engine.bid(BIDDER_1, ether(1)).unwrap();

    assert_eq!(
        engine.query(AuctionQuery::GetLockedAmount),
        AuctionQueryResponse::LockedAmount(Some(ether(10)))
    );
    assert_eq!(
        engine.query(AuctionQuery::GetEscrowBalance),
        AuctionQueryResponse::EscrowBalance(ether(16))
    );
    match engine.query(AuctionQuery::GetBidsOf { bidder: BIDDER_1 }) {
        AuctionQueryResponse::Bids(bids) => {
            assert_eq!(bids.len(), 2);
            assert_eq!(bids[1].amount, ether(1));
        }
        other => panic!("unexpected response {other:?}"),
    }

    let summary = engine.summary().unwrap();
    assert_eq!(summary.num_bids, 3);
    assert_eq!(summary.time_remaining, DURATION);

    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"num_bids\":3"));
}
