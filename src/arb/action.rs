//! Executable actions built from quoted steps.
//!
//! An action is a contract call (target address plus ABI-encoded calldata)
//! together with the token movements it is expected to cause. The engine only
//! builds actions; submitting them is up to the keeper's `Submitter`.
use std::fmt;

use alloy::primitives::{Address, Bytes, FixedBytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use eyre::{bail, eyre, Result};
use serde::{Deserialize, Serialize};

use super::conversion::Conversion;
use super::numeric::Wad;
use super::step::Step;
use super::token::TokenId;

// Order book: take up to `maxTakeAmount` of what offer `id` sells.
sol! {
    interface IMatchingMarket {
        function take(bytes32 id, uint128 maxTakeAmount) external;
    }
}

// Collateral pool: `join` mints `wad` SKR, `exit` burns `wad` SKR.
sol! {
    interface ITub {
        function join(uint256 wad) external;
        function exit(uint256 wad) external;
    }
}

// Auctions: `boom` sells `wad` SKR for surplus, `bust` buys `wad` SKR.
sol! {
    interface ITap {
        function boom(uint256 wad) external;
        function bust(uint256 wad) external;
    }
}

// Batching contract owned by the operating account.
sol! {
    interface ITxManager {
        function execute(address[] tokens, bytes script) external;
    }
}

/// Taking an offer leaves less than this behind only as rounding dust, so the
/// whole offer is taken instead.
const TAKE_DUST: &str = "0.0000000001";

/// Addresses of the contracts actions are sent to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Order book (`MatchingMarket`)
    pub otc: Address,
    /// Collateral pool (`Tub`)
    pub tub: Address,
    /// Auctions (`Tap`)
    pub tap: Address,
}

/// An amount of one token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Token moved
    pub token: TokenId,
    /// Amount moved
    pub amount: Wad,
}

/// A contract call ready to be submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    /// Contract called
    pub contract: Address,
    /// ABI-encoded call
    pub calldata: Bytes,
    /// Mechanism name, e.g. `tap.boom()`
    pub name: String,
    /// Tokens the operating account is expected to pay
    pub spends: Vec<TokenAmount>,
    /// Tokens the operating account is expected to receive
    pub receives: Vec<TokenAmount>,
}

impl Action {
    /// Builds the call executing `step` against `deployment`.
    ///
    /// # Errors
    /// When an amount is negative or does not fit the call's integer type.
    pub fn for_step(step: &Step, deployment: &Deployment) -> Result<Self> {
        let (contract, calldata) = match step.conversion() {
            Conversion::Take(offer) => {
                let quantity = take_quantity(step.target_amount(), offer.sell_amount)?;
                let call = IMatchingMarket::takeCall {
                    id: FixedBytes::from(offer.id.to_be_bytes::<32>()),
                    maxTakeAmount: u128::try_from(quantity.to_u256()?)
                        .map_err(|_| eyre!("take quantity {quantity} does not fit uint128"))?,
                };
                (deployment.otc, call.abi_encode())
            }
            Conversion::Join(_) => {
                let call = ITub::joinCall {
                    wad: step.target_amount().to_u256()?,
                };
                (deployment.tub, call.abi_encode())
            }
            Conversion::Exit(_) => {
                let call = ITub::exitCall {
                    wad: step.source_amount().to_u256()?,
                };
                (deployment.tub, call.abi_encode())
            }
            Conversion::Boom(_) => {
                let call = ITap::boomCall {
                    wad: step.source_amount().to_u256()?,
                };
                (deployment.tap, call.abi_encode())
            }
            Conversion::Bust(_) => {
                let call = ITap::bustCall {
                    wad: step.target_amount().to_u256()?,
                };
                (deployment.tap, call.abi_encode())
            }
        };

        Ok(Self {
            contract,
            calldata: Bytes::from(calldata),
            name: step.name(),
            spends: vec![TokenAmount {
                token: step.source_token(),
                amount: step.source_amount(),
            }],
            receives: vec![TokenAmount {
                token: step.target_token(),
                amount: step.target_amount(),
            }],
        })
    }

    /// Wraps `actions` into one `execute` call on the batching contract so
    /// they apply together or not at all.
    ///
    /// The script is the packed concatenation of `(address, uint256 length,
    /// calldata)` for each action. `tokens` are the tokens the batching
    /// contract may move on behalf of the operating account.
    ///
    /// # Errors
    /// When there is nothing to batch.
    pub fn batch(tx_manager: Address, tokens: &[TokenId], actions: &[Self]) -> Result<Self> {
        if actions.is_empty() {
            bail!("Batch must have at least 1 action");
        }

        let mut script = Vec::new();
        for action in actions {
            script.extend_from_slice(action.contract.as_slice());
            script.extend_from_slice(&U256::from(action.calldata.len()).to_be_bytes::<32>());
            script.extend_from_slice(&action.calldata);
        }

        let call = ITxManager::executeCall {
            tokens: tokens.iter().map(TokenId::address).collect(),
            script: Bytes::from(script),
        };

        Ok(Self {
            contract: tx_manager,
            calldata: Bytes::from(call.abi_encode()),
            name: format!(
                "tx_manager.execute({})",
                actions
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            spends: actions.iter().flat_map(|a| a.spends.clone()).collect(),
            receives: actions.iter().flat_map(|a| a.receives.clone()).collect(),
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.name, self.contract)
    }
}

/// Amount passed to `take`: what we expect to receive, never more than the
/// offer holds, and the whole offer when only dust would remain.
fn take_quantity(target_amount: Wad, sell_amount: Wad) -> Result<Wad> {
    let quantity = target_amount.min(sell_amount);
    let remainder = sell_amount.checked_sub(quantity)?;
    let dust: Wad = TAKE_DUST.parse()?;
    if remainder < dust {
        return Ok(sell_amount);
    }
    Ok(quantity)
}
