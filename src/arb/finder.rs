//! Cycle search over a `ConversionGraph`.
//!
//! The finder walks the graph depth first from the base token, quoting every
//! conversion with the amount that would actually arrive at it, and records
//! every path that returns to the base token. Ranking the result is left to
//! [`actionable`] and [`best`].
use log::debug;

use super::conversion::Conversion;
use super::graph::ConversionGraph;
use super::numeric::{Ray, Wad};
use super::sequence::Sequence;
use super::step::Step;
use super::token::TokenId;
use crate::error::NumericError;

/// Rates at or below `1 + RATE_EPSILON` are rounding noise, not profit.
pub const RATE_EPSILON: &str = "0.000001";

/// Enumerates closed sequences through one block's graph.
#[derive(Debug)]
pub struct OpportunityFinder<'a> {
    /// Edges to search
    graph: &'a ConversionGraph,
    /// Longest sequence considered
    max_depth: usize,
}

impl<'a> OpportunityFinder<'a> {
    /// A finder bounded by the number of tokens in the graph.
    #[must_use]
    pub fn new(graph: &'a ConversionGraph) -> Self {
        Self {
            graph,
            max_depth: graph.tokens().len(),
        }
    }

    /// Overrides the depth bound.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Every closed sequence starting with `entry_amount` of `base_token`.
    ///
    /// Paths never revisit a token except by closing on the base token, and
    /// any branch where a step would move nothing is pruned. Sequences come
    /// back in discovery order; an empty result just means there is nothing to
    /// do this block.
    #[must_use]
    pub fn find_sequences(&self, base_token: TokenId, entry_amount: Wad) -> Vec<Sequence> {
        let mut result = Vec::new();
        if !entry_amount.is_positive() || !self.graph.tokens().contains(&base_token) {
            return result;
        }

        let mut visited = vec![base_token];
        let mut path = Vec::new();
        self.dfs(
            base_token,
            base_token,
            entry_amount,
            entry_amount,
            &mut visited,
            &mut path,
            &mut result,
        );
        debug!(
            "Found {} sequences from {} {}",
            result.len(),
            entry_amount,
            base_token
        );
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn dfs(
        &self,
        base_token: TokenId,
        current_token: TokenId,
        carried: Wad,
        entry_amount: Wad,
        visited: &mut Vec<TokenId>,
        path: &mut Vec<&'a Conversion>,
        result: &mut Vec<Sequence>,
    ) {
        if path.len() >= self.max_depth {
            return;
        }

        for conversion in self.graph.outgoing(current_token) {
            let step = match Step::new(conversion, carried) {
                Ok(step) if !step.is_empty() => step,
                Ok(_) => continue,
                Err(e) => {
                    debug!("Skipping {conversion}: {e}");
                    continue;
                }
            };

            let target = step.target_token();
            path.push(conversion);

            if target == base_token {
                match Sequence::quote(path.as_slice(), entry_amount) {
                    Ok(Some(sequence)) => result.push(sequence),
                    Ok(None) => {}
                    Err(e) => debug!("Dropping sequence through {conversion}: {e}"),
                }
            } else if !visited.contains(&target) {
                visited.push(target);
                self.dfs(
                    base_token,
                    target,
                    step.target_amount(),
                    entry_amount,
                    visited,
                    path,
                    result,
                );
                visited.pop();
            }

            path.pop();
        }
    }
}

/// Sequences worth executing, most profitable first.
///
/// A sequence qualifies when its total rate is above `1 + RATE_EPSILON` and
/// its profit in `base_token` is above `min_profit`. The sort is stable, so
/// equal profits keep discovery order.
///
/// # Errors
/// `NumericError` if the rate threshold cannot be built.
pub fn actionable(
    sequences: Vec<Sequence>,
    base_token: TokenId,
    min_profit: Wad,
) -> Result<Vec<Sequence>, NumericError> {
    let min_rate = Ray::one().checked_add(RATE_EPSILON.parse()?)?;

    let mut ranked: Vec<(Wad, Sequence)> = sequences
        .into_iter()
        .filter_map(|sequence| {
            let (rate, profit) = match (sequence.total_rate(), sequence.profit(base_token)) {
                (Ok(rate), Ok(profit)) => (rate, profit),
                (Err(e), _) | (_, Err(e)) => {
                    debug!("Ignoring {sequence:?}: {e}");
                    return None;
                }
            };
            if rate > min_rate && profit > min_profit {
                Some((profit, sequence))
            } else {
                debug!("Rejected sequence with rate {rate} and profit {profit}");
                None
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(ranked.into_iter().map(|(_, sequence)| sequence).collect())
}

/// The single most profitable actionable sequence, if any.
///
/// # Errors
/// See [`actionable`].
pub fn best(
    sequences: Vec<Sequence>,
    base_token: TokenId,
    min_profit: Wad,
) -> Result<Option<Sequence>, NumericError> {
    Ok(actionable(sequences, base_token, min_profit)?
        .into_iter()
        .next())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arb::test_helpers::*;

    fn names(sequence: &Sequence) -> Vec<String> {
        sequence.steps().iter().map(Step::name).collect()
    }

    #[test]
    fn test_three_offer_cycle() {
        let graph = three_offer_book();
        let sequences = OpportunityFinder::new(&graph).find_sequences(token("SAI"), wad("100"));

        assert_eq!(sequences.len(), 1);
        assert_eq!(
            names(&sequences[0]),
            vec!["otc.take(1)", "otc.take(2)", "otc.take(3)"]
        );
        assert_eq!(sequences[0].profit(token("SAI")).unwrap(), wad("15"));
    }

    #[test]
    fn test_min_profit_threshold() {
        let graph = three_offer_book();
        let finder = OpportunityFinder::new(&graph);

        let found = finder.find_sequences(token("SAI"), wad("100"));
        let best_13 = best(found.clone(), token("SAI"), wad("13")).unwrap();
        assert_eq!(best_13.unwrap().profit(token("SAI")).unwrap(), wad("15"));

        assert_eq!(best(found.clone(), token("SAI"), wad("16")).unwrap(), None);
        // Profit must be strictly above the minimum
        assert_eq!(best(found, token("SAI"), wad("15")).unwrap(), None);
    }

    #[test]
    fn test_limited_entry_amount() {
        let graph = three_offer_book();
        let found = OpportunityFinder::new(&graph).find_sequences(token("SAI"), wad("90"));
        let sequence = best(found, token("SAI"), wad("13")).unwrap().unwrap();
        assert_eq!(sequence.entry_amount(), wad("90"));
        assert_eq!(sequence.profit(token("SAI")).unwrap(), wad("13.5"));
    }

    #[test]
    fn test_back_and_forth_pair_terminates() {
        let graph = book(&[
            (1, "SKR", "100", "SAI", "100"),
            (2, "SAI", "100", "SKR", "100"),
            (3, "GEM", "100", "SKR", "100"),
            (4, "SKR", "100", "GEM", "100"),
        ]);
        let found = OpportunityFinder::new(&graph).find_sequences(token("SAI"), wad("10"));
        // SAI -> SKR -> SAI only; SKR <-> GEM never closes on SAI
        assert_eq!(found.len(), 1);
        assert_eq!(names(&found[0]), vec!["otc.take(1)", "otc.take(2)"]);
        // Break-even is not actionable
        assert!(actionable(found, token("SAI"), Wad::ZERO).unwrap().is_empty());
    }

    #[test]
    fn test_revisited_token_ends_path_beyond_depth_bound() {
        let graph = book(&[
            (1, "SKR", "100", "SAI", "100"),
            (2, "SAI", "100", "SKR", "100"),
            (3, "GEM", "100", "SKR", "100"),
            (4, "SKR", "100", "GEM", "100"),
        ]);
        // Deep enough for SAI -> SKR -> GEM -> SKR -> SAI if SKR could repeat
        let found = OpportunityFinder::new(&graph)
            .with_max_depth(6)
            .find_sequences(token("SAI"), wad("10"));
        assert_eq!(found.len(), 1);
        assert_eq!(names(&found[0]), vec!["otc.take(1)", "otc.take(2)"]);
    }

    #[test]
    fn test_parallel_offers_yield_separate_sequences() {
        let graph = book(&[
            (1, "SKR", "105", "SAI", "100"),
            (2, "SKR", "120", "SAI", "100"),
            (3, "SAI", "1100", "SKR", "1000"),
        ]);
        let found = OpportunityFinder::new(&graph).find_sequences(token("SAI"), wad("100"));
        assert_eq!(found.len(), 2);

        let ranked = actionable(found, token("SAI"), Wad::ZERO).unwrap();
        let profits: Vec<_> = ranked
            .iter()
            .map(|s| s.profit(token("SAI")).unwrap())
            .collect();
        // Found through offer 1 first, ranked after the richer offer 2
        assert_eq!(profits, vec![wad("32"), wad("15.5")]);
        assert_eq!(names(&ranked[0]), vec!["otc.take(2)", "otc.take(3)"]);
        assert_eq!(names(&ranked[1]), vec!["otc.take(1)", "otc.take(3)"]);
    }

    #[test]
    fn test_depth_bound() {
        let graph = three_offer_book();
        let found = OpportunityFinder::new(&graph)
            .with_max_depth(2)
            .find_sequences(token("SAI"), wad("100"));
        assert!(found.is_empty());
    }

    #[test]
    fn test_nothing_to_find() {
        let graph = three_offer_book();
        let finder = OpportunityFinder::new(&graph);
        assert!(finder.find_sequences(token("SAI"), Wad::ZERO).is_empty());
        assert!(finder.find_sequences(token("DAI"), wad("100")).is_empty());
        assert!(actionable(vec![], token("SAI"), Wad::ZERO).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_through_protocol_and_book() {
        let mut state = protocol_state();
        state.surplus_available = wad("52500");
        let graph = ConversionGraph::from_market(
            &protocol_tokens().all(),
            &[offer(1, "SKR", "1", "SAI", "400")],
            Some(&state),
        );

        // SAI -take-> SKR -boom-> SAI: 400 SAI buys 1 SKR sold for 525
        let found = OpportunityFinder::new(&graph).find_sequences(token("SAI"), wad("1000"));
        let sequence = best(found, token("SAI"), wad("100")).unwrap().unwrap();
        assert_eq!(names(&sequence), vec!["otc.take(1)", "tap.boom()"]);
        assert_eq!(sequence.entry_amount(), wad("400"));
        assert_eq!(sequence.profit(token("SAI")).unwrap(), wad("125"));
    }
}
