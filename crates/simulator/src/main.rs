//! Local simulator for the reverse auction engine.
//!
//! Runs a scripted auction against an in-memory ledger without any chain or
//! network, and prints a JSON report of the outcome.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use reverse_auction_module::{AuctionEngine, InMemoryLedger, Ledger, TracingSink};
use reverse_auction_types::{
    format_address, AuctionParams, DuplicateBidPolicy, PayoutRule, WhitelistMode,
};

mod types;
use types::*;

#[derive(Parser)]
#[command(name = "reverse-auction-sim")]
#[command(about = "Run scripted reverse auctions against an in-memory ledger")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a sample scenario (3 winners, 10 ether ceiling, 5 minutes)
    Template,

    /// Run a scenario file
    Run {
        /// Path to the scenario JSON
        scenario: PathBuf,

        /// Override the payout rule
        #[arg(long, value_enum)]
        payout_rule: Option<PayoutRuleArg>,

        /// Reject a second bid from the same address
        #[arg(long)]
        reject_duplicates: bool,

        /// Only whitelisted addresses may bid, even with an empty whitelist
        #[arg(long)]
        strict_whitelist: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PayoutRuleArg {
    RefundOnly,
    OwnBid,
    Ceiling,
    Clearing,
}

impl From<PayoutRuleArg> for PayoutRule {
    fn from(arg: PayoutRuleArg) -> Self {
        match arg {
            PayoutRuleArg::RefundOnly => PayoutRule::RefundOnly,
            PayoutRuleArg::OwnBid => PayoutRule::OwnBid,
            PayoutRuleArg::Ceiling => PayoutRule::Ceiling,
            PayoutRuleArg::Clearing => PayoutRule::Clearing,
        }
    }
}

fn sample_scenario() -> Scenario {
    let creator = format_address(&[0xc0; 32]);
    let bidders: Vec<String> = (1u8..=4).map(|i| format_address(&[i; 32])).collect();

    let mut accounts = vec![AccountRpc {
        address: creator.clone(),
        balance: "100 ether".into(),
    }];
    accounts.extend(bidders.iter().map(|b| AccountRpc {
        address: b.clone(),
        balance: "20 ether".into(),
    }));

    let mut steps: Vec<Step> = ["7 ether", "4 ether", "9 ether", "4 ether"]
        .iter()
        .zip(&bidders)
        .map(|(amount, from)| Step::Bid {
            from: from.clone(),
            amount: amount.to_string(),
        })
        .collect();
    steps.push(Step::Advance { seconds: 300 });
    steps.push(Step::End);

    Scenario {
        engine: Default::default(),
        initial_timestamp: 1_700_000_000,
        accounts,
        auction: CreateAuctionParams {
            creator,
            winner_count: 3,
            max_bid: "10 ether".into(),
            duration: 300,
            locked_value: None,
        },
        steps,
    }
}

type SimEngine = AuctionEngine<InMemoryLedger, TracingSink>;

fn apply_step(engine: &SimEngine, step: &Step) -> Result<()> {
    match step {
        Step::Whitelist { address } => {
            let creator = engine
                .auction()
                .ok_or_else(|| anyhow!("Auction not created"))?
                .creator;
            engine.whitelist_address(creator, parse_address(address)?)?;
        }
        Step::RemoveFromWhitelist { address } => {
            let creator = engine
                .auction()
                .ok_or_else(|| anyhow!("Auction not created"))?
                .creator;
            engine.remove_from_whitelist(creator, parse_address(address)?)?;
        }
        Step::Bid { from, amount } => {
            engine.bid(parse_address(from)?, parse_amount(amount)?)?;
        }
        Step::Advance { seconds } => {
            engine.with_ledger(|ledger| ledger.advance_time(*seconds));
        }
        Step::End => {
            let creator = engine
                .auction()
                .ok_or_else(|| anyhow!("Auction not created"))?
                .creator;
            engine.end_auction(creator)?;
        }
        Step::Cancel => {
            let creator = engine
                .auction()
                .ok_or_else(|| anyhow!("Auction not created"))?
                .creator;
            engine.cancel_auction(creator)?;
        }
    }
    Ok(())
}

fn step_name(step: &Step) -> String {
    match step {
        Step::Whitelist { address } => format!("whitelist {address}"),
        Step::RemoveFromWhitelist { address } => format!("remove {address}"),
        Step::Bid { from, amount } => format!("bid {amount} from {from}"),
        Step::Advance { seconds } => format!("advance {seconds}s"),
        Step::End => "end".into(),
        Step::Cancel => "cancel".into(),
    }
}

/// Run a scenario to completion. Failed steps are recorded, not fatal.
fn run_scenario(scenario: &Scenario) -> Result<RunReport> {
    let mut ledger = InMemoryLedger::new(scenario.initial_timestamp);
    let mut addresses = Vec::with_capacity(scenario.accounts.len());
    for account in &scenario.accounts {
        let address = parse_address(&account.address)?;
        ledger
            .fund(address, parse_amount(&account.balance)?)
            .map_err(|e| anyhow!("Failed to fund {}: {}", account.address, e))?;
        addresses.push(address);
    }

    let engine = AuctionEngine::new(scenario.engine.clone(), ledger, TracingSink)
        .context("Invalid engine configuration")?;

    let params = &scenario.auction;
    let creator = parse_address(&params.creator)?;
    let auction_params = AuctionParams::new(
        params.winner_count,
        parse_amount(&params.max_bid)?,
        params.duration,
    );
    let locked_value = match &params.locked_value {
        Some(value) => parse_amount(value)?,
        None => auction_params
            .required_lock()
            .ok_or_else(|| anyhow!("Locked value overflows"))?,
    };
    engine
        .create(creator, auction_params, locked_value)
        .map_err(|e| anyhow!("Failed to create auction: {}", e))?;

    let mut outcomes = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let action = step_name(step);
        let outcome = match apply_step(&engine, step) {
            Ok(()) => {
                info!(index, %action, "Step applied");
                StepOutcome {
                    index,
                    action,
                    ok: true,
                    error: None,
                }
            }
            Err(e) => {
                warn!(index, %action, error = %e, "Step rejected");
                StepOutcome {
                    index,
                    action,
                    ok: false,
                    error: Some(e.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    let balances: Vec<(String, String)> = engine.with_ledger(|ledger| {
        addresses
            .iter()
            .map(|a| (format_address(a), format_amount(ledger.balance_of(a))))
            .collect()
    });

    Ok(RunReport {
        auction: engine.auction().as_ref().map(AuctionConfigRpc::from),
        bids: engine.bids().iter().map(BidRpc::from).collect(),
        steps: outcomes,
        settlement: engine.settlement().as_ref().map(SettlementRpc::from),
        balances,
        escrow_balance: format_amount(engine.escrow_balance()),
    })
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Template => {
            println!("{}", serde_json::to_string_pretty(&sample_scenario())?);
        }
        Commands::Run {
            scenario,
            payout_rule,
            reject_duplicates,
            strict_whitelist,
        } => {
            let data = std::fs::read_to_string(&scenario)
                .with_context(|| format!("Failed to read {}", scenario.display()))?;
            let mut scenario: Scenario =
                serde_json::from_str(&data).context("Failed to parse scenario")?;

            if let Some(rule) = payout_rule {
                scenario.engine.payout_rule = rule.into();
            }
            if reject_duplicates {
                scenario.engine.duplicate_bids = DuplicateBidPolicy::Reject;
            }
            if strict_whitelist {
                scenario.engine.whitelist_mode = WhitelistMode::Strict;
            }

            info!(
                payout_rule = ?scenario.engine.payout_rule,
                steps = scenario.steps.len(),
                "Running scenario"
            );

            let report = run_scenario(&scenario)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_scenario_runs() {
        let report = run_scenario(&sample_scenario()).unwrap();

        assert!(report.steps.iter().all(|s| s.ok));
        let settlement = report.settlement.unwrap();
        assert_eq!(settlement.status, "ended");
        // Bids 7, 4, 9, 4: the two 4s (in order) then the 7 win.
        let winners: Vec<String> = settlement.winners.iter().map(|b| b.bidder.clone()).collect();
        assert_eq!(
            winners,
            vec![
                format_address(&[2u8; 32]),
                format_address(&[4u8; 32]),
                format_address(&[1u8; 32]),
            ]
        );
        // Winners are refunded only; all 30 locked ether go back.
        assert_eq!(settlement.creator_remainder, "30 ether");
        assert_eq!(report.escrow_balance, "0 ether");
    }

    #[test]
    fn test_pay_as_bid_override() {
        let mut scenario = sample_scenario();
        scenario.engine.payout_rule = PayoutRuleArg::OwnBid.into();

        let settlement = run_scenario(&scenario).unwrap().settlement.unwrap();
        // 30 locked - (4 + 4 + 7)
        assert_eq!(settlement.creator_remainder, "15 ether");
    }

    #[test]
    fn test_rejected_step_is_recorded() {
        let mut scenario = sample_scenario();
        scenario.steps.insert(
            0,
            Step::Bid {
                from: format_address(&[1u8; 32]),
                amount: "11 ether".into(),
            },
        );
        let report = run_scenario(&scenario).unwrap();
        assert!(!report.steps[0].ok);
        assert!(report.steps[0]
            .error
            .as_deref()
            .unwrap()
            .contains("exceeds maximum"));
        assert_eq!(report.bids.len(), 4);
    }

    #[test]
    fn test_scenario_roundtrips_through_json() {
        let json = serde_json::to_string(&sample_scenario()).unwrap();
        let parsed: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.steps.len(), 6);
    }
}
