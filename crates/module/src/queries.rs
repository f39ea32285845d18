//! Query handlers for the auction module.
//!
//! These functions provide read-only access to auction state.

use reverse_auction_types::{
    Address, Amount, AuctionConfig, AuctionStatus, Bid, SettlementReport,
};
use serde::{Deserialize, Serialize};

use crate::state::AuctionState as ModuleState;

/// Query request types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionQuery {
    /// Get the full auction configuration.
    GetAuction,

    /// Number of winners (N).
    GetWinnerCount,

    /// Bid ceiling (M).
    GetMaxBid,

    /// Creator funds locked at creation.
    GetLockedAmount,

    /// Everything currently held in escrow.
    GetEscrowBalance,

    /// Bidding deadline.
    GetEndTime,

    /// Lifecycle status.
    GetStatus,

    /// All bids in submission order.
    GetBids,

    /// Bids of one identity.
    GetBidsOf { bidder: Address },

    /// Whitelist membership test.
    IsWhitelisted { address: Address },

    /// Whitelisted identities in byte order.
    GetWhitelist,

    /// Outcome of finalization, if any.
    GetSettlement,

    /// Listing summary at a point in time.
    GetSummary { now: u64 },
}

/// Query response types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionQueryResponse {
    Auction(Option<AuctionConfig>),
    WinnerCount(Option<u32>),
    MaxBid(Option<Amount>),
    LockedAmount(Option<Amount>),
    EscrowBalance(Amount),
    EndTime(Option<u64>),
    Status(Option<AuctionStatus>),
    Bids(Vec<Bid>),
    Whitelisted(bool),
    Whitelist(Vec<Address>),
    Settlement(Option<SettlementReport>),
    Summary(Option<AuctionSummary>),
}

/// Handle a query.
pub fn handle_query(state: &ModuleState, query: AuctionQuery) -> AuctionQueryResponse {
    let config = state.config.as_ref();
    match query {
        AuctionQuery::GetAuction => AuctionQueryResponse::Auction(config.cloned()),

        AuctionQuery::GetWinnerCount => {
            AuctionQueryResponse::WinnerCount(config.map(|c| c.winner_count))
        }

        AuctionQuery::GetMaxBid => AuctionQueryResponse::MaxBid(config.map(|c| c.max_bid)),

        AuctionQuery::GetLockedAmount => {
            AuctionQueryResponse::LockedAmount(config.map(|c| c.locked_amount))
        }

        AuctionQuery::GetEscrowBalance => {
            AuctionQueryResponse::EscrowBalance(state.escrow_balance())
        }

        AuctionQuery::GetEndTime => AuctionQueryResponse::EndTime(config.map(|c| c.end_time)),

        AuctionQuery::GetStatus => AuctionQueryResponse::Status(state.status()),

        AuctionQuery::GetBids => AuctionQueryResponse::Bids(state.bids.clone()),

        AuctionQuery::GetBidsOf { bidder } => {
            let bids = state.bids_of(&bidder).into_iter().cloned().collect();
            AuctionQueryResponse::Bids(bids)
        }

        AuctionQuery::IsWhitelisted { address } => {
            AuctionQueryResponse::Whitelisted(state.is_whitelisted(&address))
        }

        AuctionQuery::GetWhitelist => {
            AuctionQueryResponse::Whitelist(state.whitelist.iter().copied().collect())
        }

        AuctionQuery::GetSettlement => AuctionQueryResponse::Settlement(state.settlement.clone()),

        AuctionQuery::GetSummary { now } => AuctionQueryResponse::Summary(summarize(state, now)),
    }
}

/// Summary of an auction for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSummary {
    pub creator: Address,
    pub status: AuctionStatus,
    pub winner_count: u32,
    pub max_bid: Amount,
    pub locked_amount: Amount,
    pub escrow_balance: Amount,
    pub end_time: u64,
    pub time_remaining: u64,
    pub accepting_bids: bool,
    pub num_bids: usize,
    pub whitelist_size: usize,
}

/// Seconds until bidding closes, zero once passed.
pub fn time_remaining(config: &AuctionConfig, now: u64) -> u64 {
    config.end_time.saturating_sub(now)
}

/// Build a summary, if the auction exists.
pub fn summarize(state: &ModuleState, now: u64) -> Option<AuctionSummary> {
    let config = state.config.as_ref()?;
    Some(AuctionSummary {
        creator: config.creator,
        status: config.status,
        winner_count: config.winner_count,
        max_bid: config.max_bid,
        locked_amount: config.locked_amount,
        escrow_balance: state.escrow_balance(),
        end_time: config.end_time,
        time_remaining: time_remaining(config, now),
        accepting_bids: config.status == AuctionStatus::Open && now < config.end_time,
        num_bids: state.bids.len(),
        whitelist_size: state.whitelist.len(),
    })
}
