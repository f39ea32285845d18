//! Core type definitions for escrowed reverse auctions.
//!
//! This crate provides the shared data structures used across the auction system:
//! identities and amounts, auction parameters and status, recorded bids, settlement
//! reports, and the events the engine emits.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

// =========================
// IDENTITIES AND AMOUNTS
// =========================

/// Generic address type (32 bytes)
pub type Address = [u8; 32];

/// Value in the smallest ledger unit (wei-like).
pub type Amount = u128;

/// Smallest units per whole ether.
pub const WEI_PER_ETHER: Amount = 1_000_000_000_000_000_000;

/// Convert whole ether into the smallest unit.
pub const fn ether(whole: u64) -> Amount {
    whole as Amount * WEI_PER_ETHER
}

/// Hex form of an address, used in logs and RPC-style payloads.
pub fn format_address(address: &Address) -> String {
    hex::encode(address)
}

/// Parse a hex address, with or without a `0x` prefix.
pub fn parse_address(s: &str) -> Result<Address, hex::FromHexError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let mut out = [0u8; 32];
    hex::decode_to_slice(s, &mut out)?;
    Ok(out)
}

// =========================
// POLICIES
// =========================

/// What a winning bidder is paid out of the creator's locked funds.
///
/// Every winner always gets its own bid escrow back; this only decides the
/// payment on top of it. All rules pay at most the ceiling, so the total never
/// exceeds `winner_count * max_bid`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PayoutRule {
    /// Winners only get their escrow back; the locked funds all return to
    /// the creator.
    #[default]
    RefundOnly,
    /// Pay-as-bid: each winner is paid its own bid.
    OwnBid,
    /// Each winner is paid the ceiling `max_bid`.
    Ceiling,
    /// Uniform price: the lowest losing bid, or the ceiling when nobody lost.
    Clearing,
}

/// Whether one identity may hold more than one bid.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateBidPolicy {
    /// Every entry is ranked on its own; one bidder may win several slots.
    #[default]
    Allow,
    /// A second bid from the same identity is rejected.
    Reject,
}

/// Meaning of an empty whitelist.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WhitelistMode {
    /// Empty whitelist admits everyone; once populated only members may bid.
    #[default]
    OpenWhenEmpty,
    /// Only members may bid, even while the whitelist is empty.
    Strict,
}

// =========================
// AUCTION TYPES
// =========================

/// Auction lifecycle state
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    /// Accepting bids and whitelist changes
    Open,
    /// Finalized by the creator after the deadline
    Ended,
    /// Cancelled by the creator before finalization
    Cancelled,
}

impl AuctionStatus {
    /// `Ended` and `Cancelled` are final.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuctionStatus::Open)
    }
}

/// Creator-chosen parameters for a new auction.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AuctionParams {
    /// Number of lowest bids that win (N)
    pub winner_count: u32,
    /// Inclusive bid ceiling (M)
    pub max_bid: Amount,
    /// Seconds from creation until bidding closes
    pub duration: u64,
}

impl AuctionParams {
    pub fn new(winner_count: u32, max_bid: Amount, duration: u64) -> Self {
        Self {
            winner_count,
            max_bid,
            duration,
        }
    }

    /// Value the creator must lock: `N * M`, or `None` on overflow.
    pub fn required_lock(&self) -> Option<Amount> {
        self.max_bid.checked_mul(Amount::from(self.winner_count))
    }
}

/// Full auction configuration as stored by the engine.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AuctionConfig {
    pub creator: Address,
    pub status: AuctionStatus,

    // Rules
    pub winner_count: u32,
    pub max_bid: Amount,
    pub locked_amount: Amount,

    // Timing
    pub start_time: u64,
    pub end_time: u64,
}

/// A recorded bid. Immutable once stored.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Bid {
    pub bidder: Address,
    pub amount: Amount,
    /// Submission order, starting at 0
    pub sequence: u64,
    pub timestamp: u64,
}

// =========================
// SETTLEMENT
// =========================

/// A single value movement out of escrow.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Transfer {
    pub to: Address,
    pub amount: Amount,
}

/// Why a payout line exists.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PayoutReason {
    /// A bid's escrow returned to its bidder
    BidRefund,
    /// Payment to a winner out of the creator's locked funds
    WinnerPayment,
    /// Locked funds not spent on winners
    CreatorRemainder,
}

/// One itemised line of a settlement, before netting.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct PayoutLine {
    pub recipient: Address,
    pub amount: Amount,
    pub reason: PayoutReason,
    /// Bid the line belongs to, if any
    pub sequence: Option<u64>,
}

/// Result of the single finalization (end or cancel) of an auction.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Terminal status reached
    pub status: AuctionStatus,
    /// Winning bids in ranking order (empty on cancellation)
    pub winners: Vec<Bid>,
    /// Rule used for winner payments
    pub payout_rule: PayoutRule,
    /// Sum of payments to winners out of locked funds
    pub total_payments: Amount,
    /// Sum of bid escrow returned to bidders
    pub total_refunds: Amount,
    /// Locked funds returned to the creator
    pub creator_remainder: Amount,
    /// Itemised lines
    pub lines: Vec<PayoutLine>,
    /// Netted transfers actually submitted to the ledger
    pub transfers: Vec<Transfer>,
    pub settled_at: u64,
}

impl SettlementReport {
    /// Winner identities in ranking order.
    pub fn winner_addresses(&self) -> Vec<Address> {
        self.winners.iter().map(|bid| bid.bidder).collect()
    }

    /// Total value leaving escrow.
    pub fn total_out(&self) -> Amount {
        self.transfers.iter().map(|t| t.amount).sum()
    }

    /// Net amount received by one identity.
    pub fn received_by(&self, address: &Address) -> Amount {
        self.transfers
            .iter()
            .filter(|t| &t.to == address)
            .map(|t| t.amount)
            .sum()
    }
}

// =========================
// EVENTS
// =========================

/// Notifications emitted by the engine.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionEvent {
    AuctionCreated {
        creator: Address,
        winner_count: u32,
        max_bid: Amount,
        locked_amount: Amount,
        end_time: u64,
    },
    AddressWhitelisted {
        address: Address,
    },
    AddressRemoved {
        address: Address,
    },
    BidPlaced {
        bidder: Address,
        amount: Amount,
        sequence: u64,
    },
    /// Winner identities in ranking order
    WinnersAnnounced {
        winners: Vec<Address>,
    },
    AuctionCancelled {
        refunded_bids: u64,
        returned_to_creator: Amount,
    },
}
