//! # Keeper
//!
//! Drives the opportunity engine once per block: reads balances and market
//! state, finds the most profitable sequence within the configured limits and
//! hands it to the execution adapter. Execution failures are counted; once
//! the error budget is spent the keeper stops processing blocks.

/// Collaborator traits and the types they exchange
pub mod chain;
/// Atomic and step-by-step execution
pub mod execution;
/// Recorded blocks and a paper submitter
pub mod replay;
/// Error counter and lifecycle
pub mod state;
/// Transfer formatting
pub mod transfers;

use std::sync::Arc;

use eyre::{bail, Result};
use log::{debug, error, info, warn};

use crate::arb::{best, ConversionGraph, OpportunityFinder, Sequence, TokenId, Wad};
use crate::config::KeeperConfig;
use crate::error::ExecutionError;
use chain::{MarketReader, Submitter};
use execution::{ExecutionAdapter, ExecutionReport};
use state::KeeperState;

/// What happened in one block.
#[derive(Debug, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The error budget is spent; nothing was done
    Terminated,
    /// Market state could not be read
    Skipped,
    /// Nothing actionable
    NoOpportunity,
    /// The best sequence was executed
    Executed(ExecutionReport),
    /// The best sequence did not execute
    Failed(ExecutionError),
}

/// The per-block driver.
pub struct Keeper {
    /// Run settings
    config: KeeperConfig,
    /// Source of market state
    market: Arc<dyn MarketReader>,
    /// Executes the chosen sequence
    adapter: ExecutionAdapter,
}

impl Keeper {
    /// Creates a keeper.
    #[must_use]
    pub fn new(
        config: KeeperConfig,
        market: Arc<dyn MarketReader>,
        submitter: Arc<dyn Submitter>,
    ) -> Self {
        let adapter = ExecutionAdapter::new(
            submitter,
            config.account,
            config.deployment,
            config.tx_manager,
            config.gas,
        );
        Self {
            config,
            market,
            adapter,
        }
    }

    /// Settings this keeper runs with.
    #[must_use]
    pub const fn config(&self) -> &KeeperConfig {
        &self.config
    }

    /// Checks the settings against the chain before the first block.
    ///
    /// # Errors
    /// - If the settings are invalid
    /// - If the base token is not one of the protocol's tokens
    /// - If the batching contract is not owned by the operating account
    pub async fn startup(&self) -> Result<()> {
        self.config.validate()?;

        let protocol = self.market.protocol_state().await?;
        if !protocol.tokens.all().contains(&self.config.base_token) {
            bail!(
                "Base token {} is not one of the protocol tokens",
                self.config.base_token
            );
        }

        if let Some(tx_manager) = self.config.tx_manager {
            let owner = self.market.batch_owner(tx_manager).await?;
            if owner != self.config.account {
                bail!(
                    "The TxManager has to be owned by the address the keeper is operating from, \
                     owned by {owner} instead of {}",
                    self.config.account
                );
            }
        }

        info!(
            "Keeper started for {} with base token {}, min profit {}, max engagement {}, {:?} execution",
            self.config.account,
            self.config.base_token,
            self.config.min_profit,
            self.config.max_engagement,
            self.adapter.mode()
        );
        Ok(())
    }

    /// Runs one block: find the best sequence and execute it.
    pub async fn process_block(&self, state: &mut KeeperState) -> BlockOutcome {
        if state.check_budget(self.config.max_errors) {
            error!(
                "Terminating after {} errors (max {})",
                state.errors(),
                self.config.max_errors
            );
        }
        if state.is_terminated() {
            return BlockOutcome::Terminated;
        }

        let (opportunity, tokens) = match self.best_opportunity().await {
            Ok(Some(found)) => found,
            Ok(None) => return BlockOutcome::NoOpportunity,
            Err(e) => {
                warn!("Skipping block: {e}");
                return BlockOutcome::Skipped;
            }
        };

        self.print_opportunity(&opportunity);

        match self.adapter.execute(&opportunity, &tokens).await {
            Ok(report) => BlockOutcome::Executed(report),
            Err(e) => {
                let terminated = state.record_error(self.config.max_errors);
                warn!("Execution failed: {e} ({} errors so far)", state.errors());
                if terminated {
                    error!(
                        "Terminating after {} errors (max {})",
                        state.errors(),
                        self.config.max_errors
                    );
                }
                BlockOutcome::Failed(e)
            }
        }
    }

    /// The most profitable actionable sequence and the tokens it may move.
    async fn best_opportunity(&self) -> Result<Option<(Sequence, Vec<TokenId>)>> {
        let protocol = self.market.protocol_state().await?;
        let offers = self.market.offers().await?;
        let balance = self
            .market
            .balance_of(self.config.base_token, self.config.account)
            .await?;

        let entry_amount = balance.min(self.config.max_engagement);
        if !entry_amount.is_positive() {
            debug!("Nothing to engage: balance {balance}");
            return Ok(None);
        }

        let tokens = protocol.tokens.all().to_vec();
        let graph = ConversionGraph::from_market(&tokens, &offers, Some(&protocol));
        let sequences =
            OpportunityFinder::new(&graph).find_sequences(self.config.base_token, entry_amount);
        let opportunity = best(sequences, self.config.base_token, self.config.min_profit)?;
        Ok(opportunity.map(|sequence| (sequence, tokens)))
    }

    fn print_opportunity(&self, opportunity: &Sequence) {
        let base_token = self.config.base_token;
        match opportunity.profit(base_token) {
            Ok(profit) => info!("{}", profit_line(profit, base_token)),
            Err(e) => warn!("Opportunity with unknown profit: {e}"),
        }

        let total = opportunity.steps().len();
        for (index, step) in opportunity.steps().iter().enumerate() {
            info!("Step {}/{}: {}", index + 1, total, step);
        }
    }
}

fn profit_line(profit: Wad, base_token: TokenId) -> String {
    format!("Opportunity with profit={profit} {base_token}")
}
