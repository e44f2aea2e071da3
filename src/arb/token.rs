use std::str::FromStr;

use alloy::primitives::Address;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Identifies a token by the address of its contract.
///
/// Two ids are equal only if the addresses are; wrappers of the same asset are
/// distinct tokens.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Display, Serialize, Deserialize)]
#[display("{_0}")]
#[serde(try_from = "String", into = "String")]
pub struct TokenId(pub Address);

impl TokenId {
    /// The token contract address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for TokenId {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl FromStr for TokenId {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Address::from_str(s.trim())?))
    }
}

impl TryFrom<String> for TokenId {
    type Error = eyre::Report;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenId> for String {
    fn from(value: TokenId) -> Self {
        value.0.to_string()
    }
}
