//! Scenario file and report types for the simulator.
//!
//! Addresses are hex strings and amounts are text (`"3 ether"`, `"0.5 ether"`
//! or a plain integer in wei) so scenario files stay readable.

use anyhow::{anyhow, bail, Result};
use reverse_auction_module::EngineConfig;
use reverse_auction_types::{
    format_address, Address, Amount, AuctionConfig, AuctionStatus, Bid, SettlementReport,
    WEI_PER_ETHER,
};
use serde::{Deserialize, Serialize};

/// A scripted auction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Engine policies and limits
    #[serde(default)]
    pub engine: EngineConfig,
    /// Clock value at genesis
    #[serde(default)]
    pub initial_timestamp: u64,
    /// Genesis balances
    pub accounts: Vec<AccountRpc>,
    pub auction: CreateAuctionParams,
    /// Steps applied in order after creation
    pub steps: Vec<Step>,
}

/// Genesis balance for an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRpc {
    pub address: String,
    pub balance: String,
}

/// Parameters for creating the auction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuctionParams {
    pub creator: String,
    pub winner_count: u32,
    pub max_bid: String,
    /// Seconds
    pub duration: u64,
    /// Defaults to `winner_count * max_bid`
    pub locked_value: Option<String>,
}

/// One scripted action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Whitelist { address: String },
    RemoveFromWhitelist { address: String },
    Bid { from: String, amount: String },
    Advance { seconds: u64 },
    End,
    Cancel,
}

/// Result of one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: String,
    pub ok: bool,
    pub error: Option<String>,
}

/// Auction configuration for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionConfigRpc {
    pub creator: String,
    pub status: String,
    pub winner_count: u32,
    pub max_bid: String,
    pub locked_amount: String,
    pub start_time: u64,
    pub end_time: u64,
}

impl From<&AuctionConfig> for AuctionConfigRpc {
    fn from(c: &AuctionConfig) -> Self {
        Self {
            creator: format_address(&c.creator),
            status: match c.status {
                AuctionStatus::Open => "open",
                AuctionStatus::Ended => "ended",
                AuctionStatus::Cancelled => "cancelled",
            }
            .to_string(),
            winner_count: c.winner_count,
            max_bid: format_amount(c.max_bid),
            locked_amount: format_amount(c.locked_amount),
            start_time: c.start_time,
            end_time: c.end_time,
        }
    }
}

/// Bid for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidRpc {
    pub bidder: String,
    pub amount: String,
    pub sequence: u64,
    pub timestamp: u64,
}

impl From<&Bid> for BidRpc {
    fn from(b: &Bid) -> Self {
        Self {
            bidder: format_address(&b.bidder),
            amount: format_amount(b.amount),
            sequence: b.sequence,
            timestamp: b.timestamp,
        }
    }
}

/// Settlement for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRpc {
    pub status: String,
    pub winners: Vec<BidRpc>,
    pub total_payments: String,
    pub total_refunds: String,
    pub creator_remainder: String,
    pub transfers: Vec<(String, String)>,
    pub settled_at: u64,
}

impl From<&SettlementReport> for SettlementRpc {
    fn from(r: &SettlementReport) -> Self {
        Self {
            status: format!("{:?}", r.status).to_lowercase(),
            winners: r.winners.iter().map(BidRpc::from).collect(),
            total_payments: format_amount(r.total_payments),
            total_refunds: format_amount(r.total_refunds),
            creator_remainder: format_amount(r.creator_remainder),
            transfers: r
                .transfers
                .iter()
                .map(|t| (format_address(&t.to), format_amount(t.amount)))
                .collect(),
            settled_at: r.settled_at,
        }
    }
}

/// Final report printed by the simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub auction: Option<AuctionConfigRpc>,
    pub bids: Vec<BidRpc>,
    pub steps: Vec<StepOutcome>,
    pub settlement: Option<SettlementRpc>,
    pub balances: Vec<(String, String)>,
    pub escrow_balance: String,
}

/// Parse a hex address, with or without `0x`.
pub fn parse_address(s: &str) -> Result<Address> {
    reverse_auction_types::parse_address(s).map_err(|e| anyhow!("Invalid address {s}: {e}"))
}

/// Parse `"3 ether"`, `"0.25 ether"` or a plain wei integer.
pub fn parse_amount(s: &str) -> Result<Amount> {
    let s = s.trim();
    let Some(whole) = s
        .strip_suffix("ether")
        .or_else(|| s.strip_suffix("eth"))
        .map(str::trim)
    else {
        return s
            .parse::<Amount>()
            .map_err(|e| anyhow!("Invalid amount {s}: {e}"));
    };

    let (int_part, frac_part) = whole.split_once('.').unwrap_or((whole, ""));
    if frac_part.len() > 18 {
        bail!("Too many decimals in {s}");
    }
    let int: Amount = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|e| anyhow!("Invalid amount {s}: {e}"))?
    };
    let frac: Amount = if frac_part.is_empty() {
        0
    } else {
        let padded = format!("{frac_part:0<18}");
        padded
            .parse()
            .map_err(|e| anyhow!("Invalid amount {s}: {e}"))?
    };

    int.checked_mul(WEI_PER_ETHER)
        .and_then(|wei| wei.checked_add(frac))
        .ok_or_else(|| anyhow!("Amount {s} overflows"))
}

/// Render an amount in ether when it is a whole number of ether, wei otherwise.
pub fn format_amount(amount: Amount) -> String {
    if amount % WEI_PER_ETHER == 0 {
        format!("{} ether", amount / WEI_PER_ETHER)
    } else {
        amount.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverse_auction_types::ether;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("3 ether").unwrap(), ether(3));
        assert_eq!(parse_amount("3ether").unwrap(), ether(3));
        assert_eq!(parse_amount("0.5 eth").unwrap(), WEI_PER_ETHER / 2);
        assert_eq!(parse_amount("12345").unwrap(), 12_345);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("1.0000000000000000001 ether").is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(ether(10)), "10 ether");
        assert_eq!(format_amount(7), "7");
    }

    #[test]
    fn test_step_json() {
        let step: Step =
            serde_json::from_str(r#"{ "bid": { "from": "0x01", "amount": "1 ether" } }"#).unwrap();
        assert!(matches!(step, Step::Bid { .. }));
        let step: Step = serde_json::from_str(r#""end""#).unwrap();
        assert!(matches!(step, Step::End));
    }
}
