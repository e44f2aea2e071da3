//! Typed errors raised by the opportunity engine.
//!
//! The engine reports narrow, matchable errors. The keeper and the binary wrap
//! them into `eyre::Report` when they cross into application code.

use thiserror::Error;

/// Failure of fixed-point arithmetic or parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    /// The result does not fit in the backing 256-bit integer.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// Division by zero.
    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),

    /// A decimal string could not be parsed.
    #[error("invalid decimal `{0}`")]
    Parse(String),
}

/// A conversion could not be quoted against the current external state.
///
/// The graph drops such a conversion for the current block; the search carries
/// on without it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// External state is unusable (e.g. a zero collateral ratio).
    #[error("malformed state for {mechanism}: {reason}")]
    MalformedState {
        /// Mechanism being quoted.
        mechanism: String,
        /// What is wrong with the state.
        reason: String,
    },

    /// Arithmetic failed while quoting.
    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// A submitted action did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Step `step` (1-based) of `total` did not apply; later steps were abandoned.
    #[error("step {step}/{total} ({name}) was not applied")]
    StepNotApplied {
        /// 1-based index of the failing step.
        step: usize,
        /// Number of steps in the sequence.
        total: usize,
        /// Mechanism name of the failing step.
        name: String,
    },

    /// The atomic batch did not apply; no step took effect.
    #[error("atomic batch of {steps} steps was not applied")]
    BatchNotApplied {
        /// Number of steps in the batch.
        steps: usize,
    },

    /// The action could not be built or submitted.
    #[error("submission failed: {0}")]
    Submission(String),
}
