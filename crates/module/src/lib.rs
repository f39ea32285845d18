//! Reverse auction module with escrow.
//!
//! This module implements the logic of a sealed-bid reverse auction:
//!
//! - Auction creation with the creator's funds locked up front
//! - Creator-managed whitelist of bidders
//! - Bid submission under a price ceiling, escrowed per bidder
//! - Ranking of the lowest bids and atomic settlement
//! - Cancellation with full refunds
//!
//! # Architecture
//!
//! - `call`: Message types for state-changing operations
//! - `handlers`: Business logic for processing calls
//! - `ranking`: Winner selection and settlement planning
//! - `queries`: Read-only state access
//! - `state`: Auction state and escrow accounting
//! - `ledger`: Ledger and event sink capabilities
//! - `config`: Policy and limits configuration
//! - `engine`: Serialized front door owning state, ledger and sink
//! - `error`: Error types
//!
//! # Example
//!
//! ```
//! use reverse_auction_module::{AuctionEngine, EngineConfig, InMemoryLedger, RecordingSink};
//! use reverse_auction_types::{ether, AuctionParams};
//!
//! let creator = [1u8; 32];
//! let bidder = [2u8; 32];
//!
//! let mut ledger = InMemoryLedger::new(0);
//! ledger.fund(creator, ether(10)).unwrap();
//! ledger.fund(bidder, ether(10)).unwrap();
//!
//! let engine = AuctionEngine::new(EngineConfig::default(), ledger, RecordingSink::new()).unwrap();
//! engine.create(creator, AuctionParams::new(2, ether(5), 60), ether(10)).unwrap();
//! engine.bid(bidder, ether(3)).unwrap();
//!
//! engine.with_ledger(|ledger| ledger.advance_time(60));
//! let report = engine.end_auction(creator).unwrap();
//! assert_eq!(report.winner_addresses(), vec![bidder]);
//! ```

pub mod call;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod queries;
pub mod ranking;
pub mod state;

pub use call::{AuctionCall, CallOutcome};
pub use config::{AuctionLimits, ConfigError, EngineConfig};
pub use engine::AuctionEngine;
pub use error::AuctionError;
pub use handlers::{CallContext, HandlerResult};
pub use ledger::{EventSink, InMemoryLedger, Ledger, LedgerError, RecordingSink, TracingSink};
pub use queries::{AuctionQuery, AuctionQueryResponse, AuctionSummary};
pub use state::AuctionState;
