/// A sequence is a closed chain of steps: each step pays in what the previous one
/// received and the last one returns to the token the first one started from.
/// It is what the finder produces and what the keeper ranks and executes.
use std::fmt::{self, Debug};

use eyre::{bail, Result};

use super::conversion::Conversion;
use super::numeric::{Ray, Wad};
use super::step::Step;
use super::token::TokenId;
use crate::error::{NumericError, QuoteError};

/// An ordered, closed chain of quoted steps.
#[derive(Clone, PartialEq, Eq)]
pub struct Sequence {
    /// Steps in execution order
    steps: Vec<Step>,
}

impl Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sequence({})",
            self.steps
                .iter()
                .map(|s| format!("{s:?}"))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl Sequence {
    /// Builds a sequence from already quoted steps.
    ///
    /// # Errors
    /// When there are no steps or when consecutive steps do not connect
    /// (including the last step back to the first).
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        let sequence = Self { steps };
        sequence.validate_steps()?;
        Ok(sequence)
    }

    /// Quotes `path` starting with `entry_amount` of its first source token.
    ///
    /// Amounts are propagated step by step. When a step's ceiling cuts the
    /// carried amount, the entry amount is scaled down by the same proportion
    /// and the path is quoted again, so the whole chain trades less instead of
    /// stranding the excess half-way. Every pass either fits all ceilings or
    /// shrinks the entry, and there are at most as many passes as steps.
    /// Amounts truncate, so a shrunk entry fits the ceiling that cut it. If the
    /// passes run out while a step still clamps, that last pass stands and the
    /// cut excess of the intermediate token stays with the account.
    ///
    /// Returns `None` when some step would move nothing.
    ///
    /// # Errors
    /// `QuoteError` when a conversion cannot be quoted.
    pub fn quote(path: &[&Conversion], entry_amount: Wad) -> Result<Option<Self>, QuoteError> {
        let mut entry = entry_amount;
        let mut passes = 0;

        loop {
            passes += 1;
            let Some((steps, reduced_entry)) = Self::propagate(path, entry)? else {
                return Ok(None);
            };

            match reduced_entry {
                Some(reduced) if !reduced.is_positive() => return Ok(None),
                Some(reduced) if reduced < entry && passes <= path.len() => entry = reduced,
                _ => return Ok(Some(Self { steps })),
            }
        }
    }

    /// One forward pass. Yields the steps and, if some ceiling cut the carried
    /// amount, the entry amount that would just fit the first such ceiling.
    fn propagate(
        path: &[&Conversion],
        entry: Wad,
    ) -> Result<Option<(Vec<Step>, Option<Wad>)>, QuoteError> {
        let mut steps = Vec::with_capacity(path.len());
        let mut reduced_entry = None;
        let mut carried = entry;

        for conversion in path {
            let step = Step::new(conversion, carried)?;
            if step.is_empty() {
                return Ok(None);
            }
            if reduced_entry.is_none() && step.source_amount() < carried {
                reduced_entry = Some(entry.mul_div(step.source_amount(), carried)?);
            }
            carried = step.target_amount();
            steps.push(step);
        }

        if steps.is_empty() {
            return Ok(None);
        }
        Ok(Some((steps, reduced_entry)))
    }

    fn validate_steps(&self) -> Result<()> {
        if self.steps.is_empty() {
            bail!("Sequence must have at least 1 step");
        }

        for i in 0..self.steps.len() {
            let next = (i + 1) % self.steps.len();
            if self.steps[i].target_token() != self.steps[next].source_token() {
                bail!(
                    "Step {} target ({}) does not match step {} source ({})",
                    i,
                    self.steps[i].target_token(),
                    next,
                    self.steps[next].source_token()
                );
            }
        }
        Ok(())
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The token the sequence starts and ends with.
    #[must_use]
    pub fn base_token(&self) -> TokenId {
        self.steps[0].source_token()
    }

    /// Amount paid into the first step.
    #[must_use]
    pub fn entry_amount(&self) -> Wad {
        self.steps[0].source_amount()
    }

    /// Amount received from the last step.
    #[must_use]
    pub fn exit_amount(&self) -> Wad {
        self.steps[self.steps.len() - 1].target_amount()
    }

    /// Product of every step's realised rate.
    ///
    /// # Errors
    /// `NumericError` on overflow.
    pub fn total_rate(&self) -> Result<Ray, NumericError> {
        self.steps
            .iter()
            .try_fold(Ray::one(), |total, step| total.checked_mul(step.rate()?))
    }

    /// Net amount of `token` gained by running the sequence (negative for a
    /// loss).
    ///
    /// For the base token this is the last step's target amount minus the
    /// first step's source amount.
    ///
    /// # Errors
    /// `NumericError` on overflow.
    pub fn profit(&self, token: TokenId) -> Result<Wad, NumericError> {
        self.steps.iter().try_fold(Wad::ZERO, |profit, step| {
            let mut profit = profit;
            if step.source_token() == token {
                profit = profit.checked_sub(step.source_amount())?;
            }
            if step.target_token() == token {
                profit = profit.checked_add(step.target_amount())?;
            }
            Ok(profit)
        })
    }

    /// Every token the sequence touches, in step order.
    #[must_use]
    pub fn tokens(&self) -> Vec<TokenId> {
        self.steps.iter().map(Step::source_token).collect()
    }
}
