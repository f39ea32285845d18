//! Auction module error types.

use thiserror::Error;

use reverse_auction_types::{Address, Amount, AuctionStatus};

use crate::ledger::LedgerError;

/// Errors that can occur in the auction module.
///
/// Every variant is returned before any state or balance changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Caller {} is not the auction creator", hex::encode(.caller))]
    Unauthorized { caller: Address },

    #[error("Auction closed: {reason}")]
    AuctionClosed { reason: String },

    #[error("Auction still running: now {now}, ends at {end_time}")]
    TooEarly { now: u64, end_time: u64 },

    #[error("Auction already finalized with status {status:?}")]
    AlreadyFinalized { status: AuctionStatus },

    #[error("Bid exceeds maximum amount: bid {amount}, maximum {max_bid}")]
    BidTooHigh { amount: Amount, max_bid: Amount },

    #[error("Address {} is not whitelisted", hex::encode(.bidder))]
    NotWhitelisted { bidder: Address },

    #[error("Address {} already has a bid", hex::encode(.bidder))]
    DuplicateBid { bidder: Address },

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] LedgerError),

    #[error("Auction not initialized")]
    NotInitialized,

    #[error("Auction already initialized")]
    AlreadyInitialized,

    #[error("Bid limit of {max} reached")]
    BidLimitReached { max: usize },

    #[error("Escrow accounting mismatch: held {held}, owed {owed}")]
    EscrowMismatch { held: Amount, owed: Amount },

    #[error("Winner payments {payments} exceed locked amount {locked}")]
    PaymentsExceedLock { payments: Amount, locked: Amount },

    #[error("Amount overflow in {0}")]
    Overflow(&'static str),
}

impl AuctionError {
    pub(crate) fn closed(reason: impl Into<String>) -> Self {
        AuctionError::AuctionClosed {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        AuctionError::InvalidParameters(reason.into())
    }
}
