//! State structures for the auction module.

use std::collections::{BTreeSet, HashMap};

use reverse_auction_types::{Address, Amount, AuctionConfig, AuctionStatus, Bid, SettlementReport};

use crate::error::AuctionError;

/// Auction module state.
///
/// Holds one auction. Escrow is tracked in two pools: the creator's locked
/// funds and per-bidder bid escrow. Their sum is what the ledger holds in
/// custody on the auction's behalf.
#[derive(Debug, Default, Clone)]
pub struct AuctionState {
    /// Auction configuration, set once by `create`
    pub config: Option<AuctionConfig>,

    /// Recorded bids in submission order
    pub bids: Vec<Bid>,

    /// Identities allowed to bid
    pub whitelist: BTreeSet<Address>,

    /// Creator funds still held
    pub creator_escrow: Amount,

    /// Bid escrow per bidder
    pub escrow: HashMap<Address, Amount>,

    /// Outcome of the single finalization
    pub settlement: Option<SettlementReport>,

    /// Next bid sequence number to assign
    pub next_sequence: u64,
}

impl AuctionState {
    /// Create an empty, uninitialized state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the auction configuration.
    pub fn config(&self) -> Result<&AuctionConfig, AuctionError> {
        self.config.as_ref().ok_or(AuctionError::NotInitialized)
    }

    /// Get the next bid sequence number and increment.
    pub fn allocate_sequence(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    /// Current status, if initialized.
    pub fn status(&self) -> Option<AuctionStatus> {
        self.config.as_ref().map(|c| c.status)
    }

    pub fn is_whitelisted(&self, address: &Address) -> bool {
        self.whitelist.contains(address)
    }

    /// All bids placed by one identity.
    pub fn bids_of(&self, bidder: &Address) -> Vec<&Bid> {
        self.bids.iter().filter(|b| &b.bidder == bidder).collect()
    }

    pub fn has_bid(&self, bidder: &Address) -> bool {
        self.bids.iter().any(|b| &b.bidder == bidder)
    }

    /// Get a bidder's escrow balance.
    pub fn get_escrow(&self, address: &Address) -> Amount {
        self.escrow.get(address).copied().unwrap_or(0)
    }

    /// Whether `amount` more escrow still fits in the total held.
    pub fn can_hold(&self, amount: Amount) -> bool {
        self.escrow_balance().checked_add(amount).is_some()
    }

    /// Add to a bidder's escrow.
    ///
    /// Fails without changing anything if the total held would overflow.
    pub fn add_escrow(&mut self, address: Address, amount: Amount) -> Result<(), AuctionError> {
        if !self.can_hold(amount) {
            return Err(AuctionError::Overflow("bid escrow"));
        }
        let entry = self.escrow.entry(address).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(AuctionError::Overflow("bid escrow"))?;
        Ok(())
    }

    /// Sum of bid escrow across bidders.
    ///
    /// `add_escrow` keeps the total within `Amount`, so the saturating sum is
    /// exact.
    pub fn bid_escrow(&self) -> Amount {
        self.escrow
            .values()
            .fold(0, |acc: Amount, amount| acc.saturating_add(*amount))
    }

    /// Everything held on the auction's behalf.
    pub fn escrow_balance(&self) -> Amount {
        self.creator_escrow.saturating_add(self.bid_escrow())
    }

    /// Check that held escrow matches what is owed.
    ///
    /// While open the creator is owed the locked amount and every bidder the
    /// sum of its recorded bids; after finalization nothing is owed.
    pub fn check_invariants(&self) -> Result<(), AuctionError> {
        let held = self.escrow_balance();
        let owed = match self.config.as_ref() {
            None => 0,
            Some(config) if config.status.is_terminal() => 0,
            Some(config) => self
                .bids
                .iter()
                .try_fold(config.locked_amount, |acc, b| acc.checked_add(b.amount))
                .ok_or(AuctionError::Overflow("owed escrow"))?,
        };
        if held != owed {
            return Err(AuctionError::EscrowMismatch { held, owed });
        }
        Ok(())
    }

    /// Zero every escrow pool after settlement.
    pub fn clear_escrow(&mut self) {
        self.creator_escrow = 0;
        self.escrow.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_config(locked: Amount) -> AuctionConfig {
        AuctionConfig {
            creator: [9u8; 32],
            status: AuctionStatus::Open,
            winner_count: 2,
            max_bid: locked / 2,
            locked_amount: locked,
            start_time: 0,
            end_time: 60,
        }
    }

    #[test]
    fn test_allocate_sequence() {
        let mut state = AuctionState::new();
        assert_eq!(state.allocate_sequence(), 0);
        assert_eq!(state.allocate_sequence(), 1);
        assert_eq!(state.allocate_sequence(), 2);
    }

    #[test]
    fn test_escrow_operations() {
        let mut state = AuctionState::new();
        let addr = [1u8; 32];

        assert_eq!(state.get_escrow(&addr), 0);

        state.add_escrow(addr, 100).unwrap();
        assert_eq!(state.get_escrow(&addr), 100);

        state.add_escrow(addr, 50).unwrap();
        assert_eq!(state.get_escrow(&addr), 150);
        assert_eq!(state.bid_escrow(), 150);

        state.creator_escrow = 10;
        assert_eq!(state.escrow_balance(), 160);

        state.clear_escrow();
        assert_eq!(state.escrow_balance(), 0);
    }

    #[test]
    fn test_uninitialized_config() {
        let state = AuctionState::new();
        assert!(matches!(state.config(), Err(AuctionError::NotInitialized)));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_invariants_detect_mismatch() {
        let mut state = AuctionState::new();
        state.config = Some(open_config(10));
        state.creator_escrow = 10;
        assert!(state.check_invariants().is_ok());

        state.bids.push(Bid {
            bidder: [1u8; 32],
            amount: 3,
            sequence: 0,
            timestamp: 0,
        });
        assert!(matches!(
            state.check_invariants(),
            Err(AuctionError::EscrowMismatch { held: 10, owed: 13 })
        ));

        state.add_escrow([1u8; 32], 3).unwrap();
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_escrow_overflow_is_rejected() {
        let mut state = AuctionState::new();
        state.creator_escrow = Amount::MAX - 5;
        let addr = [1u8; 32];

        state.add_escrow(addr, 5).unwrap();
        assert_eq!(state.escrow_balance(), Amount::MAX);
        assert!(!state.can_hold(1));

        assert_eq!(
            state.add_escrow(addr, 1),
            Err(AuctionError::Overflow("bid escrow"))
        );
        assert_eq!(state.get_escrow(&addr), 5);
    }
}
