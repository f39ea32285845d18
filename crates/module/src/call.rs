//! Call message types for the auction module.

use borsh::{BorshDeserialize, BorshSerialize};
use reverse_auction_types::{Address, AuctionConfig, AuctionParams, Bid, SettlementReport};

/// Call messages for the auction module.
///
/// The caller identity and attached value travel alongside the message, not
/// inside it.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum AuctionCall {
    // === Auction Lifecycle ===
    /// Create the auction; attached value must be `winner_count * max_bid`.
    Create { params: AuctionParams },

    /// Submit a bid; the attached value is the bid amount.
    Bid,

    /// Finalize after the deadline (creator only).
    EndAuction,

    /// Cancel before finalization (creator only).
    CancelAuction,

    // === Whitelist ===
    /// Allow an address to bid (creator only).
    WhitelistAddress { address: Address },

    /// Revoke an address (creator only).
    RemoveFromWhitelist { address: Address },
}

impl AuctionCall {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            AuctionCall::Create { .. } => "create",
            AuctionCall::Bid => "bid",
            AuctionCall::EndAuction => "end_auction",
            AuctionCall::CancelAuction => "cancel_auction",
            AuctionCall::WhitelistAddress { .. } => "whitelist_address",
            AuctionCall::RemoveFromWhitelist { .. } => "remove_from_whitelist",
        }
    }
}

/// Outcome of a dispatched call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    Created(AuctionConfig),
    BidPlaced(Bid),
    Settled(SettlementReport),
    /// Whether the whitelist changed
    WhitelistUpdated(bool),
}
