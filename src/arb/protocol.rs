//! Read-only snapshot of the collateral protocol and the prices derived from it.
//!
//! The protocol offers four mechanisms: `join` turns collateral (GEM) into
//! pooled collateral (SKR), `exit` does the reverse, `boom` buys surplus
//! stablecoin (SAI) with SKR and `bust` buys SKR being sold to cover bad debt.
use serde::{Deserialize, Serialize};

use super::numeric::{Ray, Wad};
use super::token::TokenId;
use crate::error::QuoteError;

/// Headroom kept below the auction ceilings so on-chain rounding cannot push a
/// call over the available amount.
const AUCTION_ROUNDING_BUFFER: &str = "0.000001";

/// The three tokens the protocol moves between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolTokens {
    /// Raw collateral (GEM)
    pub collateral: TokenId,
    /// Pooled collateral (SKR)
    pub pooled: TokenId,
    /// Stablecoin (SAI)
    pub stablecoin: TokenId,
}

impl ProtocolTokens {
    /// All three tokens.
    #[must_use]
    pub const fn all(&self) -> [TokenId; 3] {
        [self.collateral, self.pooled, self.stablecoin]
    }
}

/// State of the protocol at one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolState {
    /// Tokens involved
    pub tokens: ProtocolTokens,
    /// Reference price of SKR in SAI
    pub feed_price: Wad,
    /// GEM per SKR
    pub collateral_ratio: Ray,
    /// Minimum collateralization of a position
    pub liquidation_ratio: Ray,
    /// Auction spread: bid is `feed * (2 - spread)`, ask is `feed * spread`
    pub spread: Wad,
    /// Join/exit spread: join costs `per * spread`, exit pays `per * (2 - spread)`
    #[serde(default = "unit_spread")]
    pub join_spread: Wad,
    /// SAI surplus held by the protocol
    pub surplus_available: Wad,
    /// SAI bad debt held by the protocol
    pub deficit_available: Wad,
    /// SKR waiting to be sold to cover bad debt
    #[serde(default)]
    pub collateral_for_sale: Wad,
}

/// Serde default for spreads: no spread at all.
fn unit_spread() -> Wad {
    Wad::from_number(1)
}

impl ProtocolState {
    /// Rejects states the quoting formulas cannot work with.
    ///
    /// # Errors
    /// `QuoteError::MalformedState` naming the offending field.
    pub fn validate(&self, mechanism: &str) -> Result<(), QuoteError> {
        let two = Wad::from_number(2);
        let malformed = |reason: &str| QuoteError::MalformedState {
            mechanism: mechanism.to_string(),
            reason: reason.to_string(),
        };

        if !self.feed_price.is_positive() {
            return Err(malformed("feed price must be positive"));
        }
        if self.collateral_ratio <= Ray::ZERO {
            return Err(malformed("collateral ratio must be positive"));
        }
        if self.liquidation_ratio <= Ray::ZERO {
            return Err(malformed("liquidation ratio must be positive"));
        }
        if !self.spread.is_positive() || self.spread >= two {
            return Err(malformed("auction spread must be within (0, 2)"));
        }
        if !self.join_spread.is_positive() || self.join_spread >= two {
            return Err(malformed("join spread must be within (0, 2)"));
        }
        Ok(())
    }

    /// GEM paid per SKR on `join`.
    ///
    /// # Errors
    /// `QuoteError::Numeric` on overflow.
    pub fn join_price(&self) -> Result<Ray, QuoteError> {
        Ok(self.collateral_ratio.checked_mul(self.join_spread.to_ray()?)?)
    }

    /// GEM received per SKR on `exit`.
    ///
    /// # Errors
    /// `QuoteError::Numeric` on overflow.
    pub fn exit_price(&self) -> Result<Ray, QuoteError> {
        let factor = Wad::from_number(2).checked_sub(self.join_spread)?;
        Ok(self.collateral_ratio.checked_mul(factor.to_ray()?)?)
    }

    /// SAI received per SKR on `boom`.
    ///
    /// # Errors
    /// `QuoteError::Numeric` on overflow.
    pub fn auction_bid(&self) -> Result<Wad, QuoteError> {
        let factor = Wad::from_number(2).checked_sub(self.spread)?;
        Ok(self.feed_price.checked_mul(factor)?)
    }

    /// SAI paid per SKR on `bust`.
    ///
    /// # Errors
    /// `QuoteError::Numeric` on overflow.
    pub fn auction_ask(&self) -> Result<Wad, QuoteError> {
        Ok(self.feed_price.checked_mul(self.spread)?)
    }

    /// SKR that can currently be sold on `boom`.
    ///
    /// # Errors
    /// `QuoteError` when the state is malformed or arithmetic fails.
    pub fn boomable_amount(&self) -> Result<Wad, QuoteError> {
        let surplus = self
            .surplus_available
            .checked_sub(self.deficit_available)?
            .max(Wad::ZERO);
        let in_pooled = surplus.checked_div(self.auction_bid()?)?;
        Ok(in_pooled.checked_sub(rounding_buffer()?)?.max(Wad::ZERO))
    }

    /// SAI that can currently be spent on `bust`.
    ///
    /// # Errors
    /// `QuoteError` when the state is malformed or arithmetic fails.
    pub fn bustable_amount(&self) -> Result<Wad, QuoteError> {
        let debt = self
            .deficit_available
            .checked_sub(self.surplus_available)?
            .max(Wad::ZERO);
        let for_sale = self.collateral_for_sale.checked_mul(self.auction_ask()?)?;
        Ok(debt
            .max(for_sale)
            .checked_sub(rounding_buffer()?)?
            .max(Wad::ZERO))
    }
}

fn rounding_buffer() -> Result<Wad, QuoteError> {
    Ok(AUCTION_ROUNDING_BUFFER.parse()?)
}
