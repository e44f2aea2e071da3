//! Command line and environment configuration.
//!
//! Every option can also be given through the environment (a `.env` file is
//! loaded first). The parsed arguments are turned into a [`KeeperConfig`],
//! which is what the rest of the keeper reads.
use std::path::PathBuf;

use alloy::primitives::Address;
use clap::Parser;
use eyre::{bail, Result};

use crate::arb::{Deployment, TokenId, Wad};
use crate::keeper::chain::GasPolicy;

/// Arbitrage keeper command line.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Ethereum account from which to send transactions
    #[arg(long, env = "ETH_FROM")]
    pub eth_from: Address,

    /// Ethereum address of the Tub contract
    #[arg(long, env = "TUB_ADDRESS")]
    pub tub_address: Address,

    /// Ethereum address of the Tap contract
    #[arg(long, env = "TAP_ADDRESS")]
    pub tap_address: Address,

    /// Ethereum address of the OasisDEX contract
    #[arg(long, env = "OASIS_ADDRESS")]
    pub oasis_address: Address,

    /// Ethereum address of the TxManager contract to use for multi-step arbitrage
    #[arg(long, env = "TX_MANAGER")]
    pub tx_manager: Option<Address>,

    /// Gas price in Wei (default: node default)
    #[arg(long, env = "GAS_PRICE", default_value_t = 0)]
    pub gas_price: u128,

    /// The token all arbitrage sequences will start and end with
    #[arg(long, env = "BASE_TOKEN")]
    pub base_token: TokenId,

    /// Minimum profit (in base token) from one arbitrage operation
    #[arg(long, env = "MIN_PROFIT")]
    pub min_profit: Wad,

    /// Maximum engagement (in base token) in one arbitrage operation
    #[arg(long, env = "MAX_ENGAGEMENT")]
    pub max_engagement: Wad,

    /// Maximum number of allowed errors before the keeper terminates
    #[arg(long, env = "MAX_ERRORS", default_value_t = 100)]
    pub max_errors: u32,

    /// JSON file of recorded blocks to replay
    #[arg(long, env = "SNAPSHOTS")]
    pub snapshots: PathBuf,

    /// Enable debug output
    #[arg(long, env = "DEBUG")]
    pub debug: bool,
}

/// Settings of one keeper run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeeperConfig {
    /// Operating account
    pub account: Address,
    /// Contracts steps are executed against
    pub deployment: Deployment,
    /// Batching contract; enables atomic execution
    pub tx_manager: Option<Address>,
    /// Gas price policy
    pub gas: GasPolicy,
    /// Token sequences start and end with
    pub base_token: TokenId,
    /// Profit a sequence must exceed, in the base token
    pub min_profit: Wad,
    /// Most base token committed to one sequence
    pub max_engagement: Wad,
    /// Failed executions tolerated before terminating
    pub max_errors: u32,
}

impl TryFrom<&Cli> for KeeperConfig {
    type Error = eyre::Report;

    fn try_from(cli: &Cli) -> Result<Self> {
        let config = Self {
            account: cli.eth_from,
            deployment: Deployment {
                otc: cli.oasis_address,
                tub: cli.tub_address,
                tap: cli.tap_address,
            },
            tx_manager: cli.tx_manager,
            gas: GasPolicy::from_wei(cli.gas_price),
            base_token: cli.base_token,
            min_profit: cli.min_profit,
            max_engagement: cli.max_engagement,
            max_errors: cli.max_errors,
        };
        config.validate()?;
        Ok(config)
    }
}

impl KeeperConfig {
    /// Checks the settings that do not need the chain.
    ///
    /// # Errors
    /// If `min_profit` or `max_engagement` is negative.
    pub fn validate(&self) -> Result<()> {
        if self.min_profit.is_negative() {
            bail!("Minimum profit must not be negative, got {}", self.min_profit);
        }
        if self.max_engagement.is_negative() {
            bail!(
                "Maximum engagement must not be negative, got {}",
                self.max_engagement
            );
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arb::test_helpers::*;

    fn args(extra: &[&str]) -> Vec<String> {
        let mut args = vec![
            "arbitrage-keeper".to_string(),
            "--eth-from".to_string(),
            address_from_str("US").to_string(),
            "--tub-address".to_string(),
            address_from_str("TUB").to_string(),
            "--tap-address".to_string(),
            address_from_str("TAP").to_string(),
            "--oasis-address".to_string(),
            address_from_str("OTC").to_string(),
            "--base-token".to_string(),
            token("SAI").to_string(),
            "--snapshots".to_string(),
            "blocks.json".to_string(),
        ];
        args.extend(extra.iter().map(ToString::to_string));
        args
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(args(&[
            "--min-profit",
            "13",
            "--max-engagement",
            "100",
        ]))
        .unwrap();
        let config = KeeperConfig::try_from(&cli).unwrap();

        assert_eq!(config.max_errors, 100);
        assert_eq!(config.gas, GasPolicy::Node);
        assert_eq!(config.tx_manager, None);
        assert_eq!(config.min_profit, wad("13"));
        assert_eq!(config.max_engagement, wad("100"));
        assert_eq!(config.deployment.otc, address_from_str("OTC"));
        assert_eq!(config.base_token, token("SAI"));
    }

    #[test]
    fn test_explicit_options() {
        let cli = Cli::try_parse_from(args(&[
            "--min-profit",
            "0.5",
            "--max-engagement",
            "90",
            "--max-errors",
            "3",
            "--gas-price",
            "20000000000",
            "--tx-manager",
            &address_from_str("TXM").to_string(),
        ]))
        .unwrap();
        let config = KeeperConfig::try_from(&cli).unwrap();

        assert_eq!(config.max_errors, 3);
        assert_eq!(config.gas, GasPolicy::Fixed(20_000_000_000));
        assert_eq!(config.tx_manager, Some(address_from_str("TXM")));
    }

    #[test]
    fn test_missing_required_argument() {
        let result = Cli::try_parse_from(args(&["--min-profit", "1"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let cli = Cli::try_parse_from(args(&["--min-profit=-1", "--max-engagement", "100"]))
        .unwrap();
        assert_eq!(
            KeeperConfig::try_from(&cli).err().unwrap().to_string(),
            "Minimum profit must not be negative, got -1.000000000000000000"
        );
    }
}
