//! Serialized front door to the auction.
//!
//! [`AuctionEngine`] owns the module state together with its ledger and event
//! sink behind one lock. Every operation holds the lock from the clock read to
//! the last event, so operations never interleave.

use parking_lot::Mutex;
use reverse_auction_types::{
    format_address, Address, Amount, AuctionConfig, AuctionParams, AuctionStatus, Bid,
    SettlementReport,
};
use tracing::debug;

use crate::call::{AuctionCall, CallOutcome};
use crate::config::{ConfigError, EngineConfig};
use crate::error::AuctionError;
use crate::handlers::{self, CallContext, HandlerResult};
use crate::ledger::{EventSink, Ledger};
use crate::queries::{self, AuctionQuery, AuctionQueryResponse, AuctionSummary};
use crate::state::AuctionState as ModuleState;

struct Inner<L, E> {
    state: ModuleState,
    ledger: L,
    sink: E,
}

impl<L: Ledger, E: EventSink> Inner<L, E> {
    fn context(&self, sender: Address, value: Amount) -> CallContext {
        CallContext {
            sender,
            timestamp: self.ledger.now(),
            value,
        }
    }
}

/// A single reverse auction with injected ledger and event sink.
pub struct AuctionEngine<L, E> {
    config: EngineConfig,
    inner: Mutex<Inner<L, E>>,
}

impl<L: Ledger, E: EventSink> AuctionEngine<L, E> {
    /// Create an engine with no auction yet.
    pub fn new(config: EngineConfig, ledger: L, sink: E) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            inner: Mutex::new(Inner {
                state: ModuleState::new(),
                ledger,
                sink,
            }),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create the auction, locking `locked_value` from the creator.
    pub fn create(
        &self,
        creator: Address,
        params: AuctionParams,
        locked_value: Amount,
    ) -> HandlerResult<AuctionConfig> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let ctx = inner.context(creator, locked_value);
        let auction = handlers::handle_create(
            &mut inner.state,
            &self.config,
            &mut inner.ledger,
            &mut inner.sink,
            &ctx,
            params,
        )?;
        debug_assert!(inner.state.check_invariants().is_ok());
        Ok(auction)
    }

    /// Add an address to the whitelist.
    pub fn whitelist_address(&self, caller: Address, address: Address) -> HandlerResult<bool> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let ctx = inner.context(caller, 0);
        handlers::handle_whitelist_address(&mut inner.state, &mut inner.sink, &ctx, address)
    }

    /// Remove an address from the whitelist.
    pub fn remove_from_whitelist(&self, caller: Address, address: Address) -> HandlerResult<bool> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let ctx = inner.context(caller, 0);
        handlers::handle_remove_from_whitelist(&mut inner.state, &mut inner.sink, &ctx, address)
    }

    /// Place a bid of `amount`, escrowed from the caller.
    pub fn bid(&self, caller: Address, amount: Amount) -> HandlerResult<Bid> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let ctx = inner.context(caller, amount);
        let bid = handlers::handle_bid(
            &mut inner.state,
            &self.config,
            &mut inner.ledger,
            &mut inner.sink,
            &ctx,
        )?;
        debug_assert!(inner.state.check_invariants().is_ok());
        Ok(bid)
    }

    /// Finalize the auction after its deadline.
    pub fn end_auction(&self, caller: Address) -> HandlerResult<SettlementReport> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let ctx = inner.context(caller, 0);
        let report = handlers::handle_end_auction(
            &mut inner.state,
            &self.config,
            &mut inner.ledger,
            &mut inner.sink,
            &ctx,
        )?;
        debug_assert!(inner.state.check_invariants().is_ok());
        Ok(report)
    }

    /// Cancel the auction and refund everyone.
    pub fn cancel_auction(&self, caller: Address) -> HandlerResult<SettlementReport> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let ctx = inner.context(caller, 0);
        let report = handlers::handle_cancel_auction(
            &mut inner.state,
            &self.config,
            &mut inner.ledger,
            &mut inner.sink,
            &ctx,
        )?;
        debug_assert!(inner.state.check_invariants().is_ok());
        Ok(report)
    }

    /// Route a call message. `value` is the value attached by the caller.
    pub fn dispatch(
        &self,
        caller: Address,
        value: Amount,
        call: AuctionCall,
    ) -> HandlerResult<CallOutcome> {
        debug!(
            call = call.name(),
            caller = %format_address(&caller),
            value,
            "Dispatching call"
        );

        let payable = matches!(call, AuctionCall::Create { .. } | AuctionCall::Bid);
        if !payable && value != 0 {
            return Err(AuctionError::InvalidParameters(format!(
                "{} does not accept value",
                call.name()
            )));
        }

        match call {
            AuctionCall::Create { params } => {
                self.create(caller, params, value).map(CallOutcome::Created)
            }
            AuctionCall::Bid => self.bid(caller, value).map(CallOutcome::BidPlaced),
            AuctionCall::EndAuction => self.end_auction(caller).map(CallOutcome::Settled),
            AuctionCall::CancelAuction => self.cancel_auction(caller).map(CallOutcome::Settled),
            AuctionCall::WhitelistAddress { address } => self
                .whitelist_address(caller, address)
                .map(CallOutcome::WhitelistUpdated),
            AuctionCall::RemoveFromWhitelist { address } => self
                .remove_from_whitelist(caller, address)
                .map(CallOutcome::WhitelistUpdated),
        }
    }

    // ============ Queries ============

    /// Run a read-only query.
    pub fn query(&self, query: AuctionQuery) -> AuctionQueryResponse {
        queries::handle_query(&self.inner.lock().state, query)
    }

    pub fn auction(&self) -> Option<AuctionConfig> {
        self.inner.lock().state.config.clone()
    }

    pub fn winner_count(&self) -> Option<u32> {
        self.inner.lock().state.config.as_ref().map(|c| c.winner_count)
    }

    pub fn max_bid(&self) -> Option<Amount> {
        self.inner.lock().state.config.as_ref().map(|c| c.max_bid)
    }

    pub fn locked_amount(&self) -> Option<Amount> {
        self.inner.lock().state.config.as_ref().map(|c| c.locked_amount)
    }

    /// Everything currently held on the auction's behalf.
    pub fn escrow_balance(&self) -> Amount {
        self.inner.lock().state.escrow_balance()
    }

    pub fn end_time(&self) -> Option<u64> {
        self.inner.lock().state.config.as_ref().map(|c| c.end_time)
    }

    pub fn status(&self) -> Option<AuctionStatus> {
        self.inner.lock().state.status()
    }

    pub fn bids(&self) -> Vec<Bid> {
        self.inner.lock().state.bids.clone()
    }

    pub fn is_whitelisted(&self, address: &Address) -> bool {
        self.inner.lock().state.is_whitelisted(address)
    }

    pub fn settlement(&self) -> Option<SettlementReport> {
        self.inner.lock().state.settlement.clone()
    }

    /// Summary at the ledger's current time.
    pub fn summary(&self) -> Option<AuctionSummary> {
        let inner = self.inner.lock();
        queries::summarize(&inner.state, inner.ledger.now())
    }

    // ============ Capability access ============

    /// Run `f` against the ledger under the engine lock.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&mut L) -> R) -> R {
        f(&mut self.inner.lock().ledger)
    }

    /// Run `f` against the event sink under the engine lock.
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        f(&mut self.inner.lock().sink)
    }

    /// Tear down into state, ledger and sink.
    pub fn into_parts(self) -> (ModuleState, L, E) {
        let inner = self.inner.into_inner();
        (inner.state, inner.ledger, inner.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{InMemoryLedger, RecordingSink};
    use reverse_auction_types::ether;

    const CREATOR: Address = [1u8; 32];
    const BIDDER: Address = [2u8; 32];

    fn engine() -> AuctionEngine<InMemoryLedger, RecordingSink> {
        let mut ledger = InMemoryLedger::new(0);
        ledger.fund(CREATOR, ether(50)).unwrap();
        ledger.fund(BIDDER, ether(50)).unwrap();
        AuctionEngine::new(EngineConfig::default(), ledger, RecordingSink::new()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.limits.max_bids = 0;
        let result = AuctionEngine::new(config, InMemoryLedger::new(0), RecordingSink::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_operations_before_create() {
        let engine = engine();
        assert_eq!(engine.bid(BIDDER, 1), Err(AuctionError::NotInitialized));
        assert_eq!(engine.end_auction(CREATOR), Err(AuctionError::NotInitialized));
        assert!(engine.status().is_none());
    }

    #[test]
    fn test_dispatch_rejects_value_on_non_payable() {
        let engine = engine();
        engine
            .create(CREATOR, AuctionParams::new(1, ether(5), 60), ether(5))
            .unwrap();

        let result = engine.dispatch(CREATOR, 1, AuctionCall::CancelAuction);
        assert!(matches!(result, Err(AuctionError::InvalidParameters(_))));
        assert_eq!(engine.status(), Some(AuctionStatus::Open));
    }

    #[test]
    fn test_dispatch_lifecycle() {
        let engine = engine();
        let outcome = engine
            .dispatch(
                CREATOR,
                ether(5),
                AuctionCall::Create {
                    params: AuctionParams::new(1, ether(5), 60),
                },
            )
            .unwrap();
        assert!(matches!(outcome, CallOutcome::Created(_)));

        let outcome = engine.dispatch(BIDDER, ether(2), AuctionCall::Bid).unwrap();
        assert!(matches!(outcome, CallOutcome::BidPlaced(_)));

        engine.with_ledger(|ledger| ledger.advance_time(60));
        let outcome = engine.dispatch(CREATOR, 0, AuctionCall::EndAuction).unwrap();
        match outcome {
            CallOutcome::Settled(report) => assert_eq!(report.winner_addresses(), vec![BIDDER]),
            other => panic!("unexpected outcome {other:?}"),
        }

        let (state, ledger, sink) = engine.into_parts();
        assert_eq!(state.escrow_balance(), 0);
        assert_eq!(ledger.custody(), 0);
        // Bidder gets its escrow back, creator its locked funds.
        assert_eq!(ledger.balance_of(&BIDDER), ether(50));
        assert_eq!(ledger.balance_of(&CREATOR), ether(50));
        assert_eq!(sink.events().len(), 3);
    }

    #[test]
    fn test_summary_uses_ledger_clock() {
        let engine = engine();
        engine
            .create(CREATOR, AuctionParams::new(1, ether(5), 60), ether(5))
            .unwrap();
        engine.with_ledger(|ledger| ledger.advance_time(45));
        let summary = engine.summary().unwrap();
        assert_eq!(summary.time_remaining, 15);
        assert!(summary.accepting_bids);
    }
}
