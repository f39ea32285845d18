//! Engine configuration.
//!
//! Policy choices the auction rules leave open, plus operational limits, fixed
//! for the lifetime of an engine.

use reverse_auction_types::{AuctionParams, DuplicateBidPolicy, PayoutRule, WhitelistMode};
use serde::{Deserialize, Serialize};

/// Configuration for an auction engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How winners are paid out of the creator's locked funds
    pub payout_rule: PayoutRule,

    /// Whether one identity may bid more than once
    pub duplicate_bids: DuplicateBidPolicy,

    /// Meaning of an empty whitelist
    pub whitelist_mode: WhitelistMode,

    /// Operational limits
    pub limits: AuctionLimits,
}

/// Bounds applied to creator parameters and bid volume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionLimits {
    /// Shortest allowed auction (seconds)
    pub min_duration: u64,
    /// Longest allowed auction (seconds)
    pub max_duration: u64,
    /// Maximum number of recorded bids
    pub max_bids: usize,
}

impl Default for AuctionLimits {
    fn default() -> Self {
        Self {
            min_duration: 1,
            max_duration: 30 * 24 * 3600, // 30 days
            max_bids: 10_000,
        }
    }
}

impl EngineConfig {
    pub fn with_payout_rule(mut self, rule: PayoutRule) -> Self {
        self.payout_rule = rule;
        self
    }

    pub fn with_duplicate_bids(mut self, policy: DuplicateBidPolicy) -> Self {
        self.duplicate_bids = policy;
        self
    }

    pub fn with_whitelist_mode(mut self, mode: WhitelistMode) -> Self {
        self.whitelist_mode = mode;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        if limits.min_duration == 0 {
            return Err(ConfigError::InvalidLimits(
                "Minimum duration cannot be zero".into(),
            ));
        }
        if limits.min_duration > limits.max_duration {
            return Err(ConfigError::InvalidLimits(
                "Minimum duration exceeds maximum duration".into(),
            ));
        }
        if limits.max_bids == 0 {
            return Err(ConfigError::InvalidLimits(
                "Maximum bid count cannot be zero".into(),
            ));
        }
        Ok(())
    }

    /// Check creator parameters against the fixed rules and these limits.
    ///
    /// Returns the name of the first failed precondition.
    pub fn check_params(&self, params: &AuctionParams) -> Result<(), String> {
        if params.winner_count == 0 {
            return Err("winner count must be at least 1".into());
        }
        if params.max_bid == 0 {
            return Err("maximum bid must be positive".into());
        }
        if params.duration == 0 {
            return Err("duration must be positive".into());
        }
        if params.duration < self.limits.min_duration {
            return Err(format!(
                "duration {} below minimum {}",
                params.duration, self.limits.min_duration
            ));
        }
        if params.duration > self.limits.max_duration {
            return Err(format!(
                "duration {} above maximum {}",
                params.duration, self.limits.max_duration
            ));
        }
        if params.required_lock().is_none() {
            return Err("winner count times maximum bid overflows".into());
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid limits: {0}")]
    InvalidLimits(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverse_auction_types::ether;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.payout_rule, PayoutRule::RefundOnly);
        assert_eq!(config.duplicate_bids, DuplicateBidPolicy::Allow);
        assert_eq!(config.whitelist_mode, WhitelistMode::OpenWhenEmpty);
    }

    #[test]
    fn test_invalid_min_duration_zero() {
        let mut config = EngineConfig::default();
        config.limits.min_duration = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimits(_))
        ));
    }

    #[test]
    fn test_invalid_duration_range() {
        let mut config = EngineConfig::default();
        config.limits.min_duration = 100;
        config.limits.max_duration = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_check_params() {
        let config = EngineConfig::default();
        assert!(config
            .check_params(&AuctionParams::new(2, ether(5), 60))
            .is_ok());
        assert!(config
            .check_params(&AuctionParams::new(0, ether(5), 60))
            .unwrap_err()
            .contains("winner count"));
        assert!(config
            .check_params(&AuctionParams::new(2, 0, 60))
            .unwrap_err()
            .contains("maximum bid"));
        assert!(config
            .check_params(&AuctionParams::new(2, ether(5), 0))
            .unwrap_err()
            .contains("duration"));
        assert!(config
            .check_params(&AuctionParams::new(2, ether(5), 31 * 24 * 3600))
            .is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "payout_rule": "clearing" }"#).unwrap();
        assert_eq!(config.payout_rule, PayoutRule::Clearing);
        assert_eq!(config.limits, AuctionLimits::default());
    }
}
