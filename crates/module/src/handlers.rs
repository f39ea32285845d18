//! Call handlers for the auction module.
//!
//! These functions implement the business logic for each call type. Each one
//! validates every precondition before touching the ledger, and commits state
//! only after the ledger accepted the value movement, so a returned error
//! always means nothing changed.

use reverse_auction_types::{
    format_address, Address, Amount, AuctionConfig, AuctionEvent, AuctionParams, AuctionStatus,
    Bid, DuplicateBidPolicy, SettlementReport, Transfer, WhitelistMode,
};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::AuctionError;
use crate::ledger::{EventSink, Ledger};
use crate::ranking::{net_transfers, plan_cancellation, plan_settlement};
use crate::state::AuctionState as ModuleState;

/// Context provided by the runtime for each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Identity of the caller
    pub sender: Address,
    /// Current timestamp, read once per call
    pub timestamp: u64,
    /// Value attached to the call
    pub value: Amount,
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, AuctionError>;

fn ensure_creator(config: &AuctionConfig, ctx: &CallContext) -> HandlerResult<()> {
    if config.creator != ctx.sender {
        return Err(AuctionError::Unauthorized { caller: ctx.sender });
    }
    Ok(())
}

fn ensure_open(config: &AuctionConfig) -> HandlerResult<()> {
    if config.status != AuctionStatus::Open {
        return Err(AuctionError::closed(format!(
            "auction is {:?}",
            config.status
        )));
    }
    Ok(())
}

fn ensure_not_finalized(config: &AuctionConfig) -> HandlerResult<()> {
    if config.status.is_terminal() {
        return Err(AuctionError::AlreadyFinalized {
            status: config.status,
        });
    }
    Ok(())
}

/// Check that the netted transfers drain exactly what is held.
fn ensure_balanced(state: &ModuleState, transfers: &[Transfer]) -> HandlerResult<()> {
    let held = state.escrow_balance();
    let owed: Amount = transfers.iter().map(|t| t.amount).sum();
    if held != owed {
        return Err(AuctionError::EscrowMismatch { held, owed });
    }
    Ok(())
}

/// Handle Create call.
///
/// The value attached to the call must be exactly `winner_count * max_bid`.
pub fn handle_create<L, E>(
    state: &mut ModuleState,
    config: &EngineConfig,
    ledger: &mut L,
    sink: &mut E,
    ctx: &CallContext,
    params: AuctionParams,
) -> HandlerResult<AuctionConfig>
where
    L: Ledger + ?Sized,
    E: EventSink + ?Sized,
{
    if state.config.is_some() {
        return Err(AuctionError::AlreadyInitialized);
    }

    config.check_params(&params).map_err(AuctionError::invalid)?;

    let required = params
        .required_lock()
        .ok_or_else(|| AuctionError::invalid("winner count times maximum bid overflows"))?;
    if ctx.value != required {
        return Err(AuctionError::invalid(format!(
            "locked value {} must equal winner count times maximum bid ({})",
            ctx.value, required
        )));
    }

    let end_time = ctx
        .timestamp
        .checked_add(params.duration)
        .ok_or_else(|| AuctionError::invalid("end time overflows"))?;

    ledger.collect(&ctx.sender, required)?;

    let auction = AuctionConfig {
        creator: ctx.sender,
        status: AuctionStatus::Open,
        winner_count: params.winner_count,
        max_bid: params.max_bid,
        locked_amount: required,
        start_time: ctx.timestamp,
        end_time,
    };

    state.config = Some(auction.clone());
    state.creator_escrow = required;

    info!(
        creator = %format_address(&ctx.sender),
        winner_count = params.winner_count,
        max_bid = params.max_bid,
        locked = required,
        end_time,
        "Auction created"
    );

    sink.emit(AuctionEvent::AuctionCreated {
        creator: ctx.sender,
        winner_count: params.winner_count,
        max_bid: params.max_bid,
        locked_amount: required,
        end_time,
    });

    Ok(auction)
}

/// Handle WhitelistAddress call.
///
/// Returns `true` if the address was newly added. Adding twice is a no-op.
pub fn handle_whitelist_address<E>(
    state: &mut ModuleState,
    sink: &mut E,
    ctx: &CallContext,
    address: Address,
) -> HandlerResult<bool>
where
    E: EventSink + ?Sized,
{
    let auction = state.config()?;
    ensure_creator(auction, ctx)?;
    ensure_open(auction)?;

    let added = state.whitelist.insert(address);
    if added {
        debug!(address = %format_address(&address), "Address whitelisted");
        sink.emit(AuctionEvent::AddressWhitelisted { address });
    }
    Ok(added)
}

/// Handle RemoveFromWhitelist call.
///
/// Returns `true` if the address was present.
pub fn handle_remove_from_whitelist<E>(
    state: &mut ModuleState,
    sink: &mut E,
    ctx: &CallContext,
    address: Address,
) -> HandlerResult<bool>
where
    E: EventSink + ?Sized,
{
    let auction = state.config()?;
    ensure_creator(auction, ctx)?;
    ensure_open(auction)?;

    let removed = state.whitelist.remove(&address);
    if removed {
        debug!(address = %format_address(&address), "Address removed from whitelist");
        sink.emit(AuctionEvent::AddressRemoved { address });
    }
    Ok(removed)
}

/// Whether `bidder` passes the whitelist under `mode`.
pub fn may_bid(state: &ModuleState, mode: WhitelistMode, bidder: &Address) -> bool {
    match mode {
        WhitelistMode::OpenWhenEmpty => state.whitelist.is_empty() || state.is_whitelisted(bidder),
        WhitelistMode::Strict => state.is_whitelisted(bidder),
    }
}

/// Handle Bid call.
///
/// The value attached to the call is the bid amount and is held in escrow
/// until settlement.
pub fn handle_bid<L, E>(
    state: &mut ModuleState,
    config: &EngineConfig,
    ledger: &mut L,
    sink: &mut E,
    ctx: &CallContext,
) -> HandlerResult<Bid>
where
    L: Ledger + ?Sized,
    E: EventSink + ?Sized,
{
    let auction = state.config()?;
    let amount = ctx.value;

    ensure_open(auction)?;
    if ctx.timestamp >= auction.end_time {
        return Err(AuctionError::closed("Auction already ended"));
    }

    if !may_bid(state, config.whitelist_mode, &ctx.sender) {
        return Err(AuctionError::NotWhitelisted { bidder: ctx.sender });
    }

    if amount == 0 {
        return Err(AuctionError::invalid("bid amount must be positive"));
    }
    if amount > auction.max_bid {
        return Err(AuctionError::BidTooHigh {
            amount,
            max_bid: auction.max_bid,
        });
    }

    if config.duplicate_bids == DuplicateBidPolicy::Reject
        && state.has_bid(&ctx.sender)
    {
        return Err(AuctionError::DuplicateBid { bidder: ctx.sender });
    }

    if state.bids.len() >= config.limits.max_bids {
        return Err(AuctionError::BidLimitReached {
            max: config.limits.max_bids,
        });
    }

    if !state.can_hold(amount) {
        return Err(AuctionError::Overflow("bid escrow"));
    }

    ledger.collect(&ctx.sender, amount)?;

    state.add_escrow(ctx.sender, amount)?;
    let bid = Bid {
        bidder: ctx.sender,
        amount,
        sequence: state.allocate_sequence(),
        timestamp: ctx.timestamp,
    };
    state.bids.push(bid.clone());

    debug!(
        bidder = %format_address(&ctx.sender),
        amount,
        sequence = bid.sequence,
        "Bid placed"
    );

    sink.emit(AuctionEvent::BidPlaced {
        bidder: bid.bidder,
        amount,
        sequence: bid.sequence,
    });

    Ok(bid)
}

/// Handle EndAuction call.
///
/// Ranks bids, pays winners and refunds every bid escrow, returns the rest of
/// the locked funds to the creator. All transfers go to the ledger as one
/// batch; status advances only if the batch succeeds.
pub fn handle_end_auction<L, E>(
    state: &mut ModuleState,
    config: &EngineConfig,
    ledger: &mut L,
    sink: &mut E,
    ctx: &CallContext,
) -> HandlerResult<SettlementReport>
where
    L: Ledger + ?Sized,
    E: EventSink + ?Sized,
{
    let auction = state.config()?;
    ensure_not_finalized(auction)?;
    ensure_creator(auction, ctx)?;
    if ctx.timestamp < auction.end_time {
        return Err(AuctionError::TooEarly {
            now: ctx.timestamp,
            end_time: auction.end_time,
        });
    }

    let plan = plan_settlement(
        &state.bids,
        auction.creator,
        auction.winner_count,
        auction.max_bid,
        state.creator_escrow,
        config.payout_rule,
    )?;

    let transfers = net_transfers(&plan.lines)?;
    ensure_balanced(state, &transfers)?;

    if let Err(err) = ledger.transfer_batch(&transfers) {
        warn!(error = %err, "Settlement transfer batch rejected");
        return Err(err.into());
    }

    let report = SettlementReport {
        status: AuctionStatus::Ended,
        winners: plan.winners,
        payout_rule: config.payout_rule,
        total_payments: plan.total_payments,
        total_refunds: plan.total_refunds,
        creator_remainder: plan.creator_remainder,
        lines: plan.lines,
        transfers,
        settled_at: ctx.timestamp,
    };

    if let Some(auction) = state.config.as_mut() {
        auction.status = AuctionStatus::Ended;
    }
    state.clear_escrow();
    state.settlement = Some(report.clone());

    let winners = report.winner_addresses();
    info!(
        winners = winners.len(),
        bids = state.bids.len(),
        payments = report.total_payments,
        creator_remainder = report.creator_remainder,
        "Auction ended"
    );

    sink.emit(AuctionEvent::WinnersAnnounced { winners });

    Ok(report)
}

/// Handle CancelAuction call.
///
/// Allowed at any time before finalization. Every bid is refunded in full and
/// the locked funds go back to the creator.
pub fn handle_cancel_auction<L, E>(
    state: &mut ModuleState,
    config: &EngineConfig,
    ledger: &mut L,
    sink: &mut E,
    ctx: &CallContext,
) -> HandlerResult<SettlementReport>
where
    L: Ledger + ?Sized,
    E: EventSink + ?Sized,
{
    let auction = state.config()?;
    ensure_not_finalized(auction)?;
    ensure_creator(auction, ctx)?;

    let lines = plan_cancellation(&state.bids, auction.creator, state.creator_escrow);
    let transfers = net_transfers(&lines)?;
    ensure_balanced(state, &transfers)?;

    if let Err(err) = ledger.transfer_batch(&transfers) {
        warn!(error = %err, "Cancellation transfer batch rejected");
        return Err(err.into());
    }

    let total_refunds = state.bid_escrow();
    let returned_to_creator = state.creator_escrow;
    let report = SettlementReport {
        status: AuctionStatus::Cancelled,
        winners: Vec::new(),
        payout_rule: config.payout_rule,
        total_payments: 0,
        total_refunds,
        creator_remainder: returned_to_creator,
        lines,
        transfers,
        settled_at: ctx.timestamp,
    };

    if let Some(auction) = state.config.as_mut() {
        auction.status = AuctionStatus::Cancelled;
    }
    state.clear_escrow();
    state.settlement = Some(report.clone());

    info!(
        refunded_bids = state.bids.len(),
        refunds = total_refunds,
        returned_to_creator,
        "Auction cancelled"
    );

    sink.emit(AuctionEvent::AuctionCancelled {
        refunded_bids: state.bids.len() as u64,
        returned_to_creator,
    });

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{InMemoryLedger, RecordingSink};
    use reverse_auction_types::{ether, PayoutRule};

    const CREATOR: Address = [1u8; 32];
    const BIDDER_A: Address = [2u8; 32];
    const BIDDER_B: Address = [3u8; 32];

    fn test_context(sender: Address, timestamp: u64, value: Amount) -> CallContext {
        CallContext {
            sender,
            timestamp,
            value,
        }
    }

    fn funded_ledger() -> InMemoryLedger {
        let mut ledger = InMemoryLedger::new(1_000);
        for who in [CREATOR, BIDDER_A, BIDDER_B] {
            ledger.fund(who, ether(100)).unwrap();
        }
        ledger
    }

    fn setup(config: &EngineConfig) -> (ModuleState, InMemoryLedger, RecordingSink) {
        let mut state = ModuleState::new();
        let mut ledger = funded_ledger();
        let mut sink = RecordingSink::new();
        handle_create(
            &mut state,
            config,
            &mut ledger,
            &mut sink,
            &test_context(CREATOR, 1_000, ether(10)),
            AuctionParams::new(2, ether(5), 60),
        )
        .unwrap();
        (state, ledger, sink)
    }

    #[test]
    fn test_create_auction() {
        let config = EngineConfig::default();
        let (state, ledger, sink) = setup(&config);

        let auction = state.config().unwrap();
        assert_eq!(auction.creator, CREATOR);
        assert_eq!(auction.locked_amount, ether(10));
        assert_eq!(auction.end_time, 1_060);
        assert_eq!(state.escrow_balance(), ether(10));
        assert_eq!(ledger.custody(), ether(10));
        assert_eq!(ledger.balance_of(&CREATOR), ether(90));
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn test_create_wrong_locked_value() {
        let config = EngineConfig::default();
        let mut state = ModuleState::new();
        let mut ledger = funded_ledger();
        let mut sink = RecordingSink::new();

        let result = handle_create(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(CREATOR, 1_000, ether(9)),
            AuctionParams::new(2, ether(5), 60),
        );

        assert!(matches!(result, Err(AuctionError::InvalidParameters(_))));
        assert!(state.config.is_none());
        assert_eq!(ledger.custody(), 0);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_create_twice() {
        let config = EngineConfig::default();
        let (mut state, mut ledger, mut sink) = setup(&config);
        let result = handle_create(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(CREATOR, 1_000, ether(10)),
            AuctionParams::new(2, ether(5), 60),
        );
        assert!(matches!(result, Err(AuctionError::AlreadyInitialized)));
    }

    #[test]
    fn test_create_unfunded_creator() {
        let config = EngineConfig::default();
        let mut state = ModuleState::new();
        let mut ledger = InMemoryLedger::new(0);
        let mut sink = RecordingSink::new();
        let result = handle_create(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(CREATOR, 0, ether(10)),
            AuctionParams::new(2, ether(5), 60),
        );
        assert!(matches!(result, Err(AuctionError::TransferFailed(_))));
        assert!(state.config.is_none());
    }

    #[test]
    fn test_submit_bid_success() {
        let config = EngineConfig::default();
        let (mut state, mut ledger, mut sink) = setup(&config);

        let bid = handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_A, 1_010, ether(3)),
        )
        .unwrap();

        assert_eq!(bid.sequence, 0);
        assert_eq!(state.bids.len(), 1);
        assert_eq!(state.get_escrow(&BIDDER_A), ether(3));
        assert_eq!(ledger.balance_of(&BIDDER_A), ether(97));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_submit_bid_too_high() {
        let config = EngineConfig::default();
        let (mut state, mut ledger, mut sink) = setup(&config);

        let result = handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_A, 1_010, ether(6)),
        );

        assert_eq!(
            result,
            Err(AuctionError::BidTooHigh {
                amount: ether(6),
                max_bid: ether(5)
            })
        );
        assert!(state.bids.is_empty());
        assert_eq!(ledger.balance_of(&BIDDER_A), ether(100));
    }

    #[test]
    fn test_submit_bid_at_ceiling_and_zero() {
        let config = EngineConfig::default();
        let (mut state, mut ledger, mut sink) = setup(&config);

        assert!(handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_A, 1_010, ether(5)),
        )
        .is_ok());

        let result = handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_B, 1_010, 0),
        );
        assert!(matches!(result, Err(AuctionError::InvalidParameters(_))));
    }

    #[test]
    fn test_submit_bid_after_end() {
        let config = EngineConfig::default();
        let (mut state, mut ledger, mut sink) = setup(&config);

        let result = handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_A, 1_060, ether(3)),
        );

        assert_eq!(result, Err(AuctionError::closed("Auction already ended")));
    }

    #[test]
    fn test_whitelist_requires_creator() {
        let config = EngineConfig::default();
        let (mut state, _ledger, mut sink) = setup(&config);

        let result = handle_whitelist_address(
            &mut state,
            &mut sink,
            &test_context(BIDDER_A, 1_010, 0),
            BIDDER_A,
        );
        assert_eq!(result, Err(AuctionError::Unauthorized { caller: BIDDER_A }));
        assert!(state.whitelist.is_empty());
    }

    #[test]
    fn test_whitelist_is_idempotent() {
        let config = EngineConfig::default();
        let (mut state, _ledger, mut sink) = setup(&config);
        let ctx = test_context(CREATOR, 1_010, 0);

        assert_eq!(handle_whitelist_address(&mut state, &mut sink, &ctx, BIDDER_A), Ok(true));
        assert_eq!(handle_whitelist_address(&mut state, &mut sink, &ctx, BIDDER_A), Ok(false));
        assert_eq!(state.whitelist.len(), 1);

        assert_eq!(handle_remove_from_whitelist(&mut state, &mut sink, &ctx, BIDDER_A), Ok(true));
        assert_eq!(handle_remove_from_whitelist(&mut state, &mut sink, &ctx, BIDDER_A), Ok(false));
    }

    #[test]
    fn test_populated_whitelist_blocks_others() {
        let config = EngineConfig::default();
        let (mut state, mut ledger, mut sink) = setup(&config);
        handle_whitelist_address(
            &mut state,
            &mut sink,
            &test_context(CREATOR, 1_005, 0),
            BIDDER_A,
        )
        .unwrap();

        let result = handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_B, 1_010, ether(1)),
        );
        assert_eq!(result, Err(AuctionError::NotWhitelisted { bidder: BIDDER_B }));

        assert!(handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_A, 1_010, ether(1)),
        )
        .is_ok());
    }

    #[test]
    fn test_strict_whitelist_rejects_when_empty() {
        let config = EngineConfig::default().with_whitelist_mode(WhitelistMode::Strict);
        let (mut state, mut ledger, mut sink) = setup(&config);

        let result = handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_A, 1_010, ether(1)),
        );
        assert_eq!(result, Err(AuctionError::NotWhitelisted { bidder: BIDDER_A }));
    }

    #[test]
    fn test_duplicate_bid_policy() {
        let config = EngineConfig::default().with_duplicate_bids(DuplicateBidPolicy::Reject);
        let (mut state, mut ledger, mut sink) = setup(&config);
        let ctx = test_context(BIDDER_A, 1_010, ether(1));

        assert!(handle_bid(&mut state, &config, &mut ledger, &mut sink, &ctx).is_ok());
        assert_eq!(
            handle_bid(&mut state, &config, &mut ledger, &mut sink, &ctx),
            Err(AuctionError::DuplicateBid { bidder: BIDDER_A })
        );
        assert_eq!(state.bids.len(), 1);
    }

    #[test]
    fn test_bid_limit() {
        let mut config = EngineConfig::default();
        config.limits.max_bids = 1;
        let (mut state, mut ledger, mut sink) = setup(&config);

        assert!(handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_A, 1_010, ether(1)),
        )
        .is_ok());
        assert_eq!(
            handle_bid(
                &mut state,
                &config,
                &mut ledger,
                &mut sink,
                &test_context(BIDDER_B, 1_010, ether(1)),
            ),
            Err(AuctionError::BidLimitReached { max: 1 })
        );
        assert_eq!(state.status(), Some(AuctionStatus::Open));
        assert_eq!(state.bids.len(), 1);
        assert_eq!(ledger.balance_of(&BIDDER_B), ether(100));
    }

    #[test]
    fn test_bid_that_would_overflow_escrow() {
        let config = EngineConfig::default();
        let (mut state, mut ledger, mut sink) = setup(&config);
        state.creator_escrow = Amount::MAX;

        let result = handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_A, 1_010, ether(1)),
        );
        assert_eq!(result, Err(AuctionError::Overflow("bid escrow")));
        assert!(state.bids.is_empty());
        assert_eq!(ledger.balance_of(&BIDDER_A), ether(100));
    }

    #[test]
    fn test_end_auction_too_early() {
        let config = EngineConfig::default();
        let (mut state, mut ledger, mut sink) = setup(&config);

        let result = handle_end_auction(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(CREATOR, 1_059, 0),
        );
        assert_eq!(
            result,
            Err(AuctionError::TooEarly {
                now: 1_059,
                end_time: 1_060
            })
        );
    }

    #[test]
    fn test_end_auction_settles() {
        let config = EngineConfig::default();
        let (mut state, mut ledger, mut sink) = setup(&config);
        handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_A, 1_010, ether(3)),
        )
        .unwrap();
        handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_B, 1_020, ether(2)),
        )
        .unwrap();

        let report = handle_end_auction(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(CREATOR, 1_060, 0),
        )
        .unwrap();

        assert_eq!(report.winner_addresses(), vec![BIDDER_B, BIDDER_A]);
        // Winners only get their escrow back; all locked funds return.
        assert_eq!(report.payout_rule, PayoutRule::RefundOnly);
        assert_eq!(report.total_payments, 0);
        assert_eq!(report.creator_remainder, ether(10));
        for who in [CREATOR, BIDDER_A, BIDDER_B] {
            assert_eq!(ledger.balance_of(&who), ether(100));
        }
        assert_eq!(state.status(), Some(AuctionStatus::Ended));
        assert_eq!(state.escrow_balance(), 0);
        assert_eq!(ledger.custody(), 0);
        assert!(state.check_invariants().is_ok());
        assert_eq!(
            sink.announced_winners(),
            vec![vec![BIDDER_B, BIDDER_A]]
        );
    }

    #[test]
    fn test_end_auction_payments_over_lock() {
        let config = EngineConfig::default().with_payout_rule(PayoutRule::Ceiling);
        let (mut state, mut ledger, mut sink) = setup(&config);
        handle_bid(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_A, 1_010, ether(3)),
        )
        .unwrap();
        // Locked funds cover less than one ceiling payment.
        state.creator_escrow = ether(4);

        let result = handle_end_auction(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(CREATOR, 1_060, 0),
        );
        assert_eq!(
            result,
            Err(AuctionError::PaymentsExceedLock {
                payments: ether(5),
                locked: ether(4)
            })
        );
        assert_eq!(state.status(), Some(AuctionStatus::Open));
        assert_eq!(ledger.custody(), ether(13));
        assert!(sink.announced_winners().is_empty());
    }

    #[test]
    fn test_cancel_by_non_creator() {
        let config = EngineConfig::default();
        let (mut state, mut ledger, mut sink) = setup(&config);
        let result = handle_cancel_auction(
            &mut state,
            &config,
            &mut ledger,
            &mut sink,
            &test_context(BIDDER_A, 1_010, 0),
        );
        assert_eq!(result, Err(AuctionError::Unauthorized { caller: BIDDER_A }));
        assert_eq!(state.status(), Some(AuctionStatus::Open));
    }

    #[test]
    fn test_whitelist_after_cancel() {
        let config = EngineConfig::default();
        let (mut state, mut ledger, mut sink) = setup(&config);
        let ctx = test_context(CREATOR, 1_010, 0);
        handle_cancel_auction(&mut state, &config, &mut ledger, &mut sink, &ctx).unwrap();

        let result = handle_whitelist_address(&mut state, &mut sink, &ctx, BIDDER_A);
        assert!(matches!(result, Err(AuctionError::AuctionClosed { .. })));
    }
}
