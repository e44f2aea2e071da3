//! Turns a chosen sequence into transactions.
//!
//! With a batching contract configured every step goes out in one atomic
//! transaction. Without one, steps are submitted one at a time and the first
//! step that does not apply ends the execution. Steps already applied stay
//! applied; the keeper may be left holding an intermediate token.
use std::sync::Arc;

use alloy::primitives::Address;
use log::{info, warn};

use super::chain::{GasPolicy, Outcome, Submitter, Transfer};
use super::transfers::{format_amounts, format_transfers, incoming, net_movement, outgoing};
use crate::arb::{Action, Deployment, Sequence, TokenId};
use crate::error::ExecutionError;

/// How a sequence is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One transaction through the batching contract
    Atomic,
    /// One transaction per step
    StepByStep,
}

/// What a successful execution did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Mode used
    pub mode: ExecutionMode,
    /// Transactions that applied
    pub transactions: usize,
    /// Every transfer observed, in order
    pub transfers: Vec<Transfer>,
}

/// Submits sequences on behalf of the operating account.
pub struct ExecutionAdapter {
    /// Transaction sender
    submitter: Arc<dyn Submitter>,
    /// Operating account
    account: Address,
    /// Contracts the steps call
    deployment: Deployment,
    /// Batching contract, if any
    tx_manager: Option<Address>,
    /// Gas price policy
    gas: GasPolicy,
}

impl ExecutionAdapter {
    /// Creates an adapter; `tx_manager` selects atomic mode.
    #[must_use]
    pub fn new(
        submitter: Arc<dyn Submitter>,
        account: Address,
        deployment: Deployment,
        tx_manager: Option<Address>,
        gas: GasPolicy,
    ) -> Self {
        Self {
            submitter,
            account,
            deployment,
            tx_manager,
            gas,
        }
    }

    /// Mode this adapter executes in.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        if self.tx_manager.is_some() {
            ExecutionMode::Atomic
        } else {
            ExecutionMode::StepByStep
        }
    }

    /// Executes `sequence`. `tokens` are the tokens a batch may move.
    ///
    /// # Errors
    /// `ExecutionError` when a step or the batch did not apply, or when an
    /// action could not be built or sent.
    pub async fn execute(
        &self,
        sequence: &Sequence,
        tokens: &[TokenId],
    ) -> Result<ExecutionReport, ExecutionError> {
        let actions = sequence
            .steps()
            .iter()
            .map(|step| Action::for_step(step, &self.deployment))
            .collect::<eyre::Result<Vec<_>>>()
            .map_err(|e| ExecutionError::Submission(e.to_string()))?;

        let report = match self.tx_manager {
            Some(tx_manager) => self.execute_atomic(tx_manager, tokens, &actions).await?,
            None => self.execute_step_by_step(&actions).await?,
        };

        match net_movement(&report.transfers, self.account) {
            Ok(net) => info!("The profit we made is {}", format_amounts(&net)),
            Err(e) => warn!("Could not compute the profit we made: {e}"),
        }
        Ok(report)
    }

    async fn execute_atomic(
        &self,
        tx_manager: Address,
        tokens: &[TokenId],
        actions: &[Action],
    ) -> Result<ExecutionReport, ExecutionError> {
        let batch = Action::batch(tx_manager, tokens, actions)
            .map_err(|e| ExecutionError::Submission(e.to_string()))?;

        match self.submit(&batch).await? {
            Outcome::Applied { transfers } => Ok(ExecutionReport {
                mode: ExecutionMode::Atomic,
                transactions: 1,
                transfers,
            }),
            Outcome::NotApplied => Err(ExecutionError::BatchNotApplied {
                steps: actions.len(),
            }),
        }
    }

    async fn execute_step_by_step(
        &self,
        actions: &[Action],
    ) -> Result<ExecutionReport, ExecutionError> {
        let mut all_transfers = Vec::new();

        for (i, action) in actions.iter().enumerate() {
            match self.submit(action).await? {
                Outcome::Applied { transfers } => {
                    info!(
                        "Exchanged {} to {}",
                        format_transfers(&outgoing(&transfers, self.account)),
                        format_transfers(&incoming(&transfers, self.account))
                    );
                    all_transfers.extend(transfers);
                }
                Outcome::NotApplied => {
                    return Err(ExecutionError::StepNotApplied {
                        step: i + 1,
                        total: actions.len(),
                        name: action.name.clone(),
                    });
                }
            }
        }

        Ok(ExecutionReport {
            mode: ExecutionMode::StepByStep,
            transactions: actions.len(),
            transfers: all_transfers,
        })
    }

    async fn submit(&self, action: &Action) -> Result<Outcome, ExecutionError> {
        self.submitter
            .submit(action, self.gas)
            .await
            .map_err(|e| ExecutionError::Submission(format!("{action}: {e}")))
    }
}
