//! The per-block edge set.
//!
//! Every conversion quotable right now, indexed by source token. Parallel
//! conversions between the same pair (several open offers) stay separate edges.
//! The graph is rebuilt from fresh state for every block and dropped after the
//! search.
use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::conversion::Conversion;
use super::offer::Offer;
use super::protocol::ProtocolState;
use super::token::TokenId;

/// Conversions available at one block, keyed by the token they consume.
#[derive(Clone, Debug, Default)]
pub struct ConversionGraph {
    /// The active token universe, in the order given
    tokens: Vec<TokenId>,
    /// Outgoing conversions of every token
    edges: HashMap<TokenId, Vec<Conversion>>,
}

impl ConversionGraph {
    /// Builds the edge set over `tokens` from candidate conversions.
    ///
    /// A candidate is left out when:
    /// - it cannot be quoted against its state (`QuoteError`)
    /// - its ceiling is zero, so every step through it would be empty
    /// - it converts a token into itself
    /// - either of its tokens is outside the universe
    #[must_use]
    pub fn new(tokens: &[TokenId], conversions: impl IntoIterator<Item = Conversion>) -> Self {
        let mut universe: Vec<TokenId> = Vec::with_capacity(tokens.len());
        for token in tokens {
            if !universe.contains(token) {
                universe.push(*token);
            }
        }

        let mut edges: HashMap<TokenId, Vec<Conversion>> = HashMap::new();
        for conversion in conversions {
            let (source, target) = (conversion.source_token(), conversion.target_token());
            if source == target || !universe.contains(&source) || !universe.contains(&target) {
                continue;
            }

            match conversion.max_source_amount() {
                Err(e) => {
                    debug!("Excluding {conversion}: {e}");
                    continue;
                }
                Ok(Some(ceiling)) if !ceiling.is_positive() => continue,
                Ok(_) => {}
            }

            edges.entry(source).or_default().push(conversion);
        }

        Self {
            tokens: universe,
            edges,
        }
    }

    /// Builds the edge set from the order book and, if given, the protocol.
    #[must_use]
    pub fn from_market(
        tokens: &[TokenId],
        offers: &[Offer],
        protocol: Option<&ProtocolState>,
    ) -> Self {
        let mut conversions: Vec<Conversion> = offers
            .iter()
            .filter(|offer| !offer.is_empty())
            .cloned()
            .map(Conversion::Take)
            .collect();

        if let Some(state) = protocol {
            conversions.extend(Conversion::protocol(&Arc::new(state.clone())));
        }

        Self::new(tokens, conversions)
    }

    /// The active token universe.
    #[must_use]
    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Conversions consuming `token`.
    #[must_use]
    pub fn outgoing(&self, token: TokenId) -> &[Conversion] {
        self.edges.get(&token).map_or(&[], Vec::as_slice)
    }

    /// Conversions from `source` into `target`.
    #[must_use]
    pub fn between(&self, source: TokenId, target: TokenId) -> impl Iterator<Item = &Conversion> {
        self.outgoing(source)
            .iter()
            .filter(move |c| c.target_token() == target)
    }

    /// Number of conversions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Whether there is nothing to convert.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
