//! The keeper's view of the chain: what it reads each block and how it submits
//! actions. Both sides are traits so the keeper can run against a live node, a
//! recorded replay or a test double.
use alloy::primitives::Address;
use async_trait::async_trait;
use eyre::Result;

use crate::arb::{Action, Offer, ProtocolState, TokenId, Wad};

/// One ERC-20 transfer observed in a receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// Token moved
    pub token: TokenId,
    /// Sender
    pub from: Address,
    /// Recipient
    pub to: Address,
    /// Amount moved
    pub value: Wad,
}

/// What became of a submitted action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The transaction was mined and succeeded
    Applied {
        /// Transfers it caused
        transfers: Vec<Transfer>,
    },
    /// The transaction failed or was never mined; nothing changed
    NotApplied,
}

/// Gas price to submit with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GasPolicy {
    /// Let the node decide
    #[default]
    Node,
    /// Fixed price in wei
    Fixed(u128),
}

impl GasPolicy {
    /// `0` means the node default, anything else a fixed price.
    #[must_use]
    pub const fn from_wei(wei: u128) -> Self {
        if wei == 0 {
            Self::Node
        } else {
            Self::Fixed(wei)
        }
    }
}

/// Read access to one block's market and protocol state.
#[async_trait]
pub trait MarketReader: Send + Sync {
    /// Every open order-book offer.
    async fn offers(&self) -> Result<Vec<Offer>>;

    /// The protocol snapshot, including which tokens it moves between.
    async fn protocol_state(&self) -> Result<ProtocolState>;

    /// Balance of `token` held by `owner`.
    async fn balance_of(&self, token: TokenId, owner: Address) -> Result<Wad>;

    /// Owner of the batching contract at `tx_manager`.
    async fn batch_owner(&self, tx_manager: Address) -> Result<Address>;
}

/// Sends actions as transactions and waits for their outcome.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submits `action` and waits until it is mined or dropped.
    ///
    /// `Ok(Outcome::NotApplied)` is a failed transaction; `Err` means it could
    /// not be sent at all.
    async fn submit(&self, action: &Action, gas: GasPolicy) -> Result<Outcome>;
}
