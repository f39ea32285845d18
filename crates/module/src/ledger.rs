//! Capabilities the engine consumes from its host.
//!
//! The engine never touches balances or clocks directly. A [`Ledger`] supplies
//! the current time and moves value in and out of engine custody; an
//! [`EventSink`] receives notifications. [`InMemoryLedger`] and
//! [`RecordingSink`] are the reference implementations used by tests and the
//! simulator.

use std::collections::HashMap;

use reverse_auction_types::{format_address, Address, Amount, AuctionEvent, Transfer};
use thiserror::Error;
use tracing::{debug, info};

/// Errors reported by a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient funds in {}: need {needed}, have {available}", hex::encode(.account))]
    InsufficientFunds {
        account: Address,
        needed: Amount,
        available: Amount,
    },

    #[error("Custody shortfall: need {needed}, hold {available}")]
    CustodyShortfall { needed: Amount, available: Amount },

    #[error("Balance overflow")]
    Overflow,

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Identity-agnostic value transfer and clock.
pub trait Ledger {
    /// Current time in seconds. Read once per engine operation.
    fn now(&self) -> u64;

    /// Spendable balance of an account (not counting engine custody).
    fn balance_of(&self, account: &Address) -> Amount;

    /// Move `amount` from `from` into engine custody.
    fn collect(&mut self, from: &Address, amount: Amount) -> Result<(), LedgerError>;

    /// Pay out of engine custody.
    ///
    /// Must be all-or-nothing: on error no transfer of the batch is applied.
    fn transfer_batch(&mut self, transfers: &[Transfer]) -> Result<(), LedgerError>;
}

/// Receiver of engine notifications.
pub trait EventSink {
    fn emit(&mut self, event: AuctionEvent);
}

/// In-memory ledger with a manually driven clock.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    balances: HashMap<Address, Amount>,
    custody: Amount,
    timestamp: u64,
}

impl InMemoryLedger {
    pub fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    /// Credit an account out of thin air (genesis allocation).
    pub fn fund(&mut self, account: Address, amount: Amount) -> Result<(), LedgerError> {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Value currently held in engine custody.
    pub fn custody(&self) -> Amount {
        self.custody
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }

    /// Sum of all account balances plus custody, `None` on overflow.
    pub fn total_supply(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(self.custody, |acc, balance| acc.checked_add(*balance))
    }
}

impl Ledger for InMemoryLedger {
    fn now(&self) -> u64 {
        self.timestamp
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn collect(&mut self, from: &Address, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                account: *from,
                needed: amount,
                available,
            });
        }
        let custody = self
            .custody
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert(*from, available - amount);
        self.custody = custody;

        debug!(from = %format_address(from), amount, "Collected into custody");
        Ok(())
    }

    fn transfer_batch(&mut self, transfers: &[Transfer]) -> Result<(), LedgerError> {
        let needed = transfers
            .iter()
            .try_fold(0 as Amount, |acc, t| acc.checked_add(t.amount))
            .ok_or(LedgerError::Overflow)?;

        if needed > self.custody {
            return Err(LedgerError::CustodyShortfall {
                needed,
                available: self.custody,
            });
        }

        // Validate every credit before applying any of them.
        let mut credited: HashMap<Address, Amount> = HashMap::new();
        for transfer in transfers {
            let current = match credited.get(&transfer.to) {
                Some(balance) => *balance,
                None => self.balance_of(&transfer.to),
            };
            let next = current
                .checked_add(transfer.amount)
                .ok_or(LedgerError::Overflow)?;
            credited.insert(transfer.to, next);
        }

        self.balances.extend(credited);
        self.custody -= needed;

        info!(
            transfers = transfers.len(),
            total = needed,
            "Released from custody"
        );
        Ok(())
    }
}

/// Event sink that keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<AuctionEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[AuctionEvent] {
        &self.events
    }

    /// Drain recorded events.
    pub fn take(&mut self) -> Vec<AuctionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Winner lists of every `WinnersAnnounced` event seen.
    pub fn announced_winners(&self) -> Vec<Vec<Address>> {
        self.events
            .iter()
            .filter_map(|event| match event {
                AuctionEvent::WinnersAnnounced { winners } => Some(winners.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: AuctionEvent) {
        self.events.push(event);
    }
}

/// Event sink that writes events to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: AuctionEvent) {
        match &event {
            AuctionEvent::WinnersAnnounced { winners } => {
                let winners: Vec<String> = winners.iter().map(format_address).collect();
                info!(?winners, "WinnersAnnounced");
            }
            other => info!(event = ?other, "Auction event"),
        }
    }
}
