use std::fmt::{self, Debug, Display};

use super::conversion::Conversion;
use super::numeric::{Ray, Wad};
use super::token::TokenId;
use crate::error::{NumericError, QuoteError};

/// A conversion quoted for a concrete amount.
///
/// `source_amount` is what the conversion actually engages (the request clamped
/// to its ceiling) and `target_amount` what it yields for it.
#[derive(Clone, PartialEq, Eq)]
pub struct Step {
    /// The mechanism being used
    conversion: Conversion,
    /// Amount of the source token paid in
    source_amount: Wad,
    /// Amount of the target token received
    target_amount: Wad,
}

impl Step {
    /// Quotes `conversion` for `requested` of its source token.
    ///
    /// # Errors
    /// `QuoteError` when the conversion cannot be quoted against its state.
    pub fn new(conversion: &Conversion, requested: Wad) -> Result<Self, QuoteError> {
        let source_amount = conversion.engaged_amount(requested)?;
        let target_amount = conversion.quote(source_amount)?;
        Ok(Self {
            conversion: conversion.clone(),
            source_amount,
            target_amount,
        })
    }

    /// The mechanism behind this step.
    #[must_use]
    pub const fn conversion(&self) -> &Conversion {
        &self.conversion
    }

    /// Token paid in.
    #[must_use]
    pub fn source_token(&self) -> TokenId {
        self.conversion.source_token()
    }

    /// Token received.
    #[must_use]
    pub fn target_token(&self) -> TokenId {
        self.conversion.target_token()
    }

    /// Amount paid in.
    #[must_use]
    pub const fn source_amount(&self) -> Wad {
        self.source_amount
    }

    /// Amount received.
    #[must_use]
    pub const fn target_amount(&self) -> Wad {
        self.target_amount
    }

    /// Mechanism name.
    #[must_use]
    pub fn name(&self) -> String {
        self.conversion.name()
    }

    /// Realised rate, `target_amount / source_amount`.
    ///
    /// # Errors
    /// `NumericError::DivisionByZero` for an empty step.
    pub fn rate(&self) -> Result<Ray, NumericError> {
        Ray::ratio(self.target_amount, self.source_amount)
    }

    /// A step that moves nothing on either side is a free edge and never used.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.source_amount.is_positive() || !self.target_amount.is_positive()
    }
}

impl Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step({:?}, {} -> {})",
            self.conversion, self.source_amount, self.target_amount
        )
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "from {} {} to {} {} using {}",
            self.source_amount,
            self.source_token(),
            self.target_amount,
            self.target_token(),
            self.name()
        )
    }
}
