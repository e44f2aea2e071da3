use std::fmt;

use alloy::primitives::U256;

use super::numeric::Wad;
use super::token::TokenId;

/// A standing order-book offer.
///
/// The maker sells up to `sell_amount` of `sell_token` and wants `buy_token` at
/// the fixed ratio `buy_amount / sell_amount`. Taking it means paying
/// `buy_token` and receiving `sell_token`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Offer {
    /// Order-book id of the offer
    pub id: U256,
    /// Token the maker pays out
    pub sell_token: TokenId,
    /// Remaining amount the maker pays out
    pub sell_amount: Wad,
    /// Token the maker wants
    pub buy_token: TokenId,
    /// Remaining amount the maker wants
    pub buy_amount: Wad,
}

impl Offer {
    /// Creates an offer.
    #[must_use]
    pub const fn new(
        id: U256,
        sell_token: TokenId,
        sell_amount: Wad,
        buy_token: TokenId,
        buy_amount: Wad,
    ) -> Self {
        Self {
            id,
            sell_token,
            sell_amount,
            buy_token,
            buy_amount,
        }
    }

    /// An offer with nothing left on either side cannot be taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.sell_amount.is_positive() || !self.buy_amount.is_positive()
    }
}

impl fmt::Debug for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Offer(#7, 105 SKR for 100 SAI)
        write!(
            f,
            "Offer(#{}, {} {} for {} {})",
            self.id, self.sell_amount, self.sell_token, self.buy_amount, self.buy_token
        )
    }
}
