//! Winner determination and settlement planning.
//!
//! Reverse auction: the lowest bids win. Ranking is a stable sort by amount
//! ascending, so equal amounts keep submission order.
//!
//! Payout rules:
//! - Refund only: winners get their escrow back and nothing more
//! - Own bid: each winner is paid its bid
//! - Ceiling: each winner is paid the maximum bid
//! - Clearing: each winner is paid the lowest losing bid (ceiling if none lost)

use std::collections::HashMap;

use reverse_auction_types::{
    Address, Amount, Bid, PayoutLine, PayoutReason, PayoutRule, Transfer,
};

use crate::error::AuctionError;
use crate::handlers::HandlerResult;

/// Result of ranking the recorded bids.
#[derive(Debug, Clone)]
pub struct Ranking<'a> {
    /// Winning bids in ranking order
    pub winners: Vec<&'a Bid>,
    /// Remaining bids in ranking order
    pub losers: Vec<&'a Bid>,
}

/// Rank bids and split off the first `min(winner_count, bids.len())`.
pub fn rank_bids(bids: &[Bid], winner_count: u32) -> Ranking<'_> {
    let mut sorted: Vec<&Bid> = bids.iter().collect();
    // Input is already in submission order; the sequence key keeps the
    // tie-break explicit if a caller passes bids out of order.
    sorted.sort_by(|a, b| a.amount.cmp(&b.amount).then(a.sequence.cmp(&b.sequence)));

    let cut = (winner_count as usize).min(sorted.len());
    let losers = sorted.split_off(cut);
    Ranking {
        winners: sorted,
        losers,
    }
}

/// Amount each winner is paid from locked funds.
pub fn winner_payment(rule: PayoutRule, winner: &Bid, ranking: &Ranking<'_>, max_bid: Amount) -> Amount {
    match rule {
        PayoutRule::RefundOnly => 0,
        PayoutRule::OwnBid => winner.amount,
        PayoutRule::Ceiling => max_bid,
        PayoutRule::Clearing => ranking
            .losers
            .first()
            .map(|bid| bid.amount)
            .unwrap_or(max_bid),
    }
}

/// Itemised settlement of an ended auction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    pub winners: Vec<Bid>,
    pub lines: Vec<PayoutLine>,
    pub total_payments: Amount,
    pub total_refunds: Amount,
    pub creator_remainder: Amount,
}

/// Plan the settlement of an ended auction.
///
/// Fails with `PaymentsExceedLock` if winner payments would exceed the
/// locked amount, which cannot happen for bids that respected the ceiling.
pub fn plan_settlement(
    bids: &[Bid],
    creator: Address,
    winner_count: u32,
    max_bid: Amount,
    locked_amount: Amount,
    rule: PayoutRule,
) -> HandlerResult<SettlementPlan> {
    let ranking = rank_bids(bids, winner_count);
    let mut lines = Vec::with_capacity(bids.len() + ranking.winners.len() + 1);
    let mut total_payments: Amount = 0;
    let mut total_refunds: Amount = 0;

    for winner in &ranking.winners {
        let payment = winner_payment(rule, winner, &ranking, max_bid);
        total_payments = total_payments
            .checked_add(payment)
            .ok_or(AuctionError::Overflow("winner payments"))?;
        lines.push(PayoutLine {
            recipient: winner.bidder,
            amount: payment,
            reason: PayoutReason::WinnerPayment,
            sequence: Some(winner.sequence),
        });
    }

    // Every bid escrow goes back to its bidder, winners included.
    for bid in bids {
        total_refunds = total_refunds
            .checked_add(bid.amount)
            .ok_or(AuctionError::Overflow("bid refunds"))?;
        lines.push(PayoutLine {
            recipient: bid.bidder,
            amount: bid.amount,
            reason: PayoutReason::BidRefund,
            sequence: Some(bid.sequence),
        });
    }

    let creator_remainder = locked_amount.checked_sub(total_payments).ok_or(
        AuctionError::PaymentsExceedLock {
            payments: total_payments,
            locked: locked_amount,
        },
    )?;
    lines.push(PayoutLine {
        recipient: creator,
        amount: creator_remainder,
        reason: PayoutReason::CreatorRemainder,
        sequence: None,
    });

    Ok(SettlementPlan {
        winners: ranking.winners.into_iter().cloned().collect(),
        lines,
        total_payments,
        total_refunds,
        creator_remainder,
    })
}

/// Plan the refunds of a cancelled auction.
pub fn plan_cancellation(bids: &[Bid], creator: Address, locked_amount: Amount) -> Vec<PayoutLine> {
    bids.iter()
        .map(|bid| PayoutLine {
            recipient: bid.bidder,
            amount: bid.amount,
            reason: PayoutReason::BidRefund,
            sequence: Some(bid.sequence),
        })
        .chain(std::iter::once(PayoutLine {
            recipient: creator,
            amount: locked_amount,
            reason: PayoutReason::CreatorRemainder,
            sequence: None,
        }))
        .collect()
}

/// Net payout lines into one transfer per recipient.
///
/// Recipients keep the order of their first line; zero totals are dropped.
pub fn net_transfers(lines: &[PayoutLine]) -> HandlerResult<Vec<Transfer>> {
    let mut order: Vec<Address> = Vec::new();
    let mut totals: HashMap<Address, Amount> = HashMap::new();
    for line in lines {
        let total = totals.entry(line.recipient).or_insert_with(|| {
            order.push(line.recipient);
            0
        });
        *total = total
            .checked_add(line.amount)
            .ok_or(AuctionError::Overflow("netted transfer"))?;
    }

    Ok(order
        .into_iter()
        .filter_map(|to| match totals.get(&to).copied() {
            Some(amount) if amount > 0 => Some(Transfer { to, amount }),
            _ => None,
        })
        .collect())
}
