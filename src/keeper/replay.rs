//! Offline collaborators.
//!
//! `SnapshotMarket` serves market state recorded block by block in a JSON file
//! and `PaperSubmitter` pretends every action applied exactly as quoted. Together
//! they let the keeper run against history without a node or funds.
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use log::info;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::chain::{GasPolicy, MarketReader, Outcome, Submitter, Transfer};
use crate::arb::{Action, Offer, ProtocolState, TokenId, Wad};

/// An order-book offer as recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRecord {
    /// Order-book id
    pub id: u64,
    /// Token the maker pays out
    pub sell_token: TokenId,
    /// Remaining amount the maker pays out
    pub sell_amount: Wad,
    /// Token the maker wants
    pub buy_token: TokenId,
    /// Remaining amount the maker wants
    pub buy_amount: Wad,
}

impl From<&OfferRecord> for Offer {
    fn from(record: &OfferRecord) -> Self {
        Self::new(
            U256::from(record.id),
            record.sell_token,
            record.sell_amount,
            record.buy_token,
            record.buy_amount,
        )
    }
}

/// Everything the keeper reads at one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    /// Block number
    pub number: u64,
    /// Protocol state
    pub protocol: ProtocolState,
    /// Open offers
    #[serde(default)]
    pub offers: Vec<OfferRecord>,
    /// Balances of the operating account
    #[serde(default)]
    pub balances: HashMap<TokenId, Wad>,
    /// Owner of the batching contract, if one is deployed
    #[serde(default)]
    pub batch_owner: Option<Address>,
}

/// A recording of consecutive blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshots {
    /// Blocks in order
    pub blocks: Vec<BlockSnapshot>,
}

/// Market reader over recorded blocks.
///
/// Starts before the first block; [`SnapshotMarket::advance`] moves to the
/// next one. Balances are those of the recorded account whatever owner is
/// asked for.
#[derive(Debug)]
pub struct SnapshotMarket {
    /// Recorded blocks
    blocks: Vec<BlockSnapshot>,
    /// Index of the next block to serve
    next: AtomicUsize,
}

impl SnapshotMarket {
    /// Wraps recorded blocks.
    #[must_use]
    pub fn new(snapshots: Snapshots) -> Self {
        Self {
            blocks: snapshots.blocks,
            next: AtomicUsize::new(0),
        }
    }

    /// Reads a recording from a JSON file.
    ///
    /// # Errors
    /// If the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read snapshots from {}", path.display()))?;
        let snapshots: Snapshots = serde_json::from_str(&json)
            .wrap_err_with(|| format!("Failed to parse snapshots in {}", path.display()))?;
        info!("Loaded {} blocks from {}", snapshots.blocks.len(), path.display());
        Ok(Self::new(snapshots))
    }

    /// Moves to the next block and returns its number, or `None` once the
    /// recording is exhausted.
    pub fn advance(&self) -> Option<u64> {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.blocks.get(index).map(|block| block.number)
    }

    /// The block being served.
    ///
    /// # Errors
    /// Before the first [`SnapshotMarket::advance`] or past the last block.
    pub fn current(&self) -> Result<&BlockSnapshot> {
        let next = self.next.load(Ordering::SeqCst);
        next.checked_sub(1)
            .and_then(|index| self.blocks.get(index))
            .ok_or_else(|| eyre!("No current block"))
    }

    /// The first recorded block, used for start-up checks.
    ///
    /// # Errors
    /// If the recording is empty.
    pub fn first(&self) -> Result<&BlockSnapshot> {
        self.blocks.first().ok_or_else(|| eyre!("No blocks recorded"))
    }

    /// Block served for reads: the current one, or the first before any
    /// block has been entered.
    fn serving(&self) -> Result<&BlockSnapshot> {
        if self.next.load(Ordering::SeqCst) == 0 {
            return self.first();
        }
        self.current()
    }
}

#[async_trait]
impl MarketReader for SnapshotMarket {
    async fn offers(&self) -> Result<Vec<Offer>> {
        Ok(self.serving()?.offers.iter().map(Offer::from).collect())
    }

    async fn protocol_state(&self) -> Result<ProtocolState> {
        Ok(self.serving()?.protocol.clone())
    }

    async fn balance_of(&self, token: TokenId, _owner: Address) -> Result<Wad> {
        Ok(self
            .serving()?
            .balances
            .get(&token)
            .copied()
            .unwrap_or(Wad::ZERO))
    }

    async fn batch_owner(&self, tx_manager: Address) -> Result<Address> {
        self.serving()?
            .batch_owner
            .ok_or_else(|| eyre!("No batching contract recorded at {tx_manager}"))
    }
}

/// Submitter that applies nothing and reports the quoted transfers.
#[derive(Debug)]
pub struct PaperSubmitter {
    /// Account the transfers are attributed to
    account: Address,
    /// Every action seen, in order
    submitted: Mutex<Vec<Action>>,
}

impl PaperSubmitter {
    /// Creates a submitter acting for `account`.
    #[must_use]
    pub fn new(account: Address) -> Self {
        Self {
            account,
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Actions submitted so far.
    pub async fn submitted(&self) -> Vec<Action> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl Submitter for PaperSubmitter {
    async fn submit(&self, action: &Action, gas: GasPolicy) -> Result<Outcome> {
        info!("Paper submitting {action} with {gas:?} gas");
        self.submitted.lock().await.push(action.clone());

        let paid = action.spends.iter().map(|spend| Transfer {
            token: spend.token,
            from: self.account,
            to: action.contract,
            value: spend.amount,
        });
        let received = action.receives.iter().map(|receive| Transfer {
            token: receive.token,
            from: action.contract,
            to: self.account,
            value: receive.amount,
        });
        Ok(Outcome::Applied {
            transfers: paid.chain(received).collect(),
        })
    }
}
