/// A conversion is one way of turning a source token into a target token: taking a
/// standing order-book offer or calling one of the protocol's mechanisms.
/// It knows its ceiling and how to quote an amount. It carries no amounts itself;
/// that is the job of `Step`.
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use super::numeric::Wad;
use super::offer::Offer;
use super::protocol::ProtocolState;
use super::token::TokenId;
use crate::error::QuoteError;

/// Every mechanism the engine can route through.
///
/// Conversions are derived from one block's state and dropped after the search;
/// the protocol variants share that block's snapshot.
#[derive(Clone, PartialEq, Eq)]
pub enum Conversion {
    /// Take an order-book offer: pay its buy token, receive its sell token
    Take(Offer),
    /// `tub.join()`: collateral into pooled collateral
    Join(Arc<ProtocolState>),
    /// `tub.exit()`: pooled collateral back into collateral
    Exit(Arc<ProtocolState>),
    /// `tap.boom()`: pooled collateral into surplus stablecoin
    Boom(Arc<ProtocolState>),
    /// `tap.bust()`: stablecoin into pooled collateral sold to cover debt
    Bust(Arc<ProtocolState>),
}

impl Conversion {
    /// The four protocol conversions for one block's state.
    #[must_use]
    pub fn protocol(state: &Arc<ProtocolState>) -> Vec<Self> {
        vec![
            Self::Join(Arc::clone(state)),
            Self::Exit(Arc::clone(state)),
            Self::Boom(Arc::clone(state)),
            Self::Bust(Arc::clone(state)),
        ]
    }

    /// Token paid into the conversion.
    #[must_use]
    pub fn source_token(&self) -> TokenId {
        match self {
            Self::Take(offer) => offer.buy_token,
            Self::Join(state) => state.tokens.collateral,
            Self::Exit(state) | Self::Boom(state) => state.tokens.pooled,
            Self::Bust(state) => state.tokens.stablecoin,
        }
    }

    /// Token received from the conversion.
    #[must_use]
    pub fn target_token(&self) -> TokenId {
        match self {
            Self::Take(offer) => offer.sell_token,
            Self::Join(state) | Self::Bust(state) => state.tokens.pooled,
            Self::Exit(state) => state.tokens.collateral,
            Self::Boom(state) => state.tokens.stablecoin,
        }
    }

    /// Human-readable name of the mechanism, e.g. `otc.take(7)`.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Take(offer) => format!("otc.take({})", offer.id),
            Self::Join(_) => "tub.join()".to_string(),
            Self::Exit(_) => "tub.exit()".to_string(),
            Self::Boom(_) => "tap.boom()".to_string(),
            Self::Bust(_) => "tap.bust()".to_string(),
        }
    }

    /// Largest source amount the conversion accepts right now.
    ///
    /// `None` means the mechanism itself sets no ceiling; the caller's balance
    /// is the only bound.
    ///
    /// # Errors
    /// `QuoteError` when the protocol state is malformed.
    pub fn max_source_amount(&self) -> Result<Option<Wad>, QuoteError> {
        match self {
            Self::Take(offer) => Ok(Some(offer.buy_amount.max(Wad::ZERO))),
            Self::Join(state) | Self::Exit(state) => {
                state.validate(&self.name())?;
                Ok(None)
            }
            Self::Boom(state) => {
                state.validate(&self.name())?;
                Ok(Some(state.boomable_amount()?))
            }
            Self::Bust(state) => {
                state.validate(&self.name())?;
                Ok(Some(state.bustable_amount()?))
            }
        }
    }

    /// The part of `requested` the conversion will actually take.
    ///
    /// Requests above the ceiling are clamped to it, never rejected; negative
    /// requests take nothing.
    ///
    /// # Errors
    /// `QuoteError` when the protocol state is malformed.
    pub fn engaged_amount(&self, requested: Wad) -> Result<Wad, QuoteError> {
        let requested = requested.max(Wad::ZERO);
        Ok(match self.max_source_amount()? {
            Some(ceiling) => requested.min(ceiling),
            None => requested,
        })
    }

    /// Target amount received for `requested` of the source token.
    ///
    /// Pure: reads the snapshot the conversion was built from and nothing else.
    /// The request is clamped with [`Self::engaged_amount`] first.
    ///
    /// # Errors
    /// `QuoteError` when the protocol state is malformed or arithmetic fails.
    pub fn quote(&self, requested: Wad) -> Result<Wad, QuoteError> {
        let amount = self.engaged_amount(requested)?;
        if amount.is_zero() {
            return Ok(Wad::ZERO);
        }

        let target = match self {
            // Integer math on the offer's own amounts, floored like the market does
            Self::Take(offer) => amount.mul_div(offer.sell_amount, offer.buy_amount)?,
            Self::Join(state) => amount.checked_div_ray(state.join_price()?)?,
            Self::Exit(state) => amount.checked_mul_ray(state.exit_price()?)?,
            Self::Boom(state) => amount.checked_mul(state.auction_bid()?)?,
            Self::Bust(state) => amount.checked_div(state.auction_ask()?)?,
        };
        Ok(target)
    }
}

impl Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Take(offer) => write!(f, "Take({offer:?})"),
            _ => write!(
                f,
                "{}({} -> {})",
                self.name(),
                self.source_token(),
                self.target_token()
            ),
        }
    }
}

impl Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.name(),
            self.source_token(),
            self.target_token()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arb::numeric::Ray;
    use crate::arb::test_helpers::*;

    #[test]
    fn test_take_tokens_and_name() {
        let conversion = take(7, "SKR", "105", "SAI", "100");
        assert_eq!(conversion.source_token(), token("SAI"));
        assert_eq!(conversion.target_token(), token("SKR"));
        assert_eq!(conversion.name(), "otc.take(7)");
        assert_eq!(conversion.max_source_amount().unwrap(), Some(wad("100")));
    }

    #[test]
    fn test_take_uses_fixed_rate_truncated() {
        let conversion = take(1, "SKR", "105", "SAI", "100");
        for (amount_in, expected_amount_out) in &[
            // in, out
            ("100", "105"),
            ("90", "94.5"),
            ("1", "1.05"),
            ("0.000000000000000001", "0.000000000000000001"),
            ("0.000000000000000003", "0.000000000000000003"),
        ] {
            assert_eq!(conversion.quote(wad(amount_in)).unwrap(), wad(expected_amount_out));
        }

        // 10 * 100 / 300 is truncated, not rounded
        let thirds = take(2, "GEM", "100", "SAI", "300");
        assert_eq!(
            thirds.quote(wad("10")).unwrap(),
            wad("3.333333333333333333")
        );
        assert_eq!(
            thirds.quote(wad("0.000000000000000002")).unwrap(),
            Wad::ZERO
        );
    }

    #[test]
    fn test_take_clamps_to_remaining_size() {
        let conversion = take(1, "SKR", "105", "SAI", "100");
        assert_eq!(conversion.engaged_amount(wad("1000")).unwrap(), wad("100"));
        assert_eq!(conversion.quote(wad("1000")).unwrap(), wad("105"));
        assert_eq!(conversion.quote(wad("100")).unwrap(), wad("105"));
        assert_eq!(conversion.quote(wad("-5")).unwrap(), Wad::ZERO);
    }

    #[test]
    fn test_take_never_exceeds_offer() {
        let conversion = take(1, "GEM", "7", "SAI", "3");
        for amount in ["0.5", "1", "2.999999999999999999", "3", "30"] {
            let quoted = conversion.quote(wad(amount)).unwrap();
            assert!(quoted <= wad("7"));
            let rate = Ray::ratio(quoted, conversion.engaged_amount(wad(amount)).unwrap()).unwrap();
            assert!(rate <= ray("2.333333333333333333333333334"));
        }
    }

    #[test]
    fn test_protocol_tokens() {
        let state = shared(protocol_state());
        let conversions = Conversion::protocol(&state);
        let pairs: Vec<_> = conversions
            .iter()
            .map(|c| (c.name(), c.source_token(), c.target_token()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("tub.join()".to_string(), token("GEM"), token("SKR")),
                ("tub.exit()".to_string(), token("SKR"), token("GEM")),
                ("tap.boom()".to_string(), token("SKR"), token("SAI")),
                ("tap.bust()".to_string(), token("SAI"), token("SKR")),
            ]
        );
    }

    #[test]
    fn test_join_and_exit_quotes() {
        let mut state = protocol_state();
        state.collateral_ratio = ray("1.25");
        let state = shared(state);

        let join = Conversion::Join(Arc::clone(&state));
        assert_eq!(join.max_source_amount().unwrap(), None);
        assert_eq!(join.quote(wad("100")).unwrap(), wad("80"));
        // No ceiling of its own
        assert_eq!(join.quote(wad("1000000")).unwrap(), wad("800000"));

        let exit = Conversion::Exit(state);
        assert_eq!(exit.quote(wad("80")).unwrap(), wad("100"));
    }

    #[test]
    fn test_boom_quote_and_ceiling() {
        let mut state = protocol_state();
        state.surplus_available = wad("5250");
        let boom = Conversion::Boom(shared(state));

        assert_eq!(boom.max_source_amount().unwrap(), Some(wad("9.999999")));
        assert_eq!(boom.quote(wad("1")).unwrap(), wad("525"));
        // Clamped to the ceiling rather than failing
        assert_eq!(boom.quote(wad("50")).unwrap(), wad("5249.999475"));
    }

    #[test]
    fn test_bust_quote_and_ceiling() {
        let mut state = protocol_state();
        state.deficit_available = wad("25000");
        state.collateral_for_sale = wad("100");
        let bust = Conversion::Bust(shared(state));

        assert_eq!(bust.max_source_amount().unwrap(), Some(wad("47499.999999")));
        assert_eq!(bust.quote(wad("14250")).unwrap(), wad("30"));
    }

    #[test]
    fn test_malformed_state_is_a_quote_error() {
        let mut state = protocol_state();
        state.collateral_ratio = Ray::ZERO;
        let state = shared(state);

        for conversion in Conversion::protocol(&state) {
            assert!(matches!(
                conversion.quote(wad("1")),
                Err(QuoteError::MalformedState { .. })
            ));
            assert!(conversion.max_source_amount().is_err());
        }
    }

    #[test]
    fn test_zero_ceiling_quotes_zero() {
        let boom = Conversion::Boom(shared(protocol_state()));
        assert_eq!(boom.max_source_amount().unwrap(), Some(Wad::ZERO));
        assert_eq!(boom.quote(wad("10")).unwrap(), Wad::ZERO);
    }
}
