//! # Opportunity Engine
//!
//! Models every way of converting one token into another at the current block,
//! searches for closed sequences of conversions that start and end in the base
//! token, and ranks them by profit. Everything here is synchronous and pure:
//! it reads a snapshot and never talks to the chain.

/// Executable contract calls built from steps
pub mod action;
/// Order-book and protocol conversions
pub mod conversion;
/// Depth-first cycle search and ranking
pub mod finder;
/// Per-block edge set
pub mod graph;
/// Fixed-point amounts and rates
pub mod numeric;
/// Standing order-book offers
pub mod offer;
/// Protocol state snapshot and derived prices
pub mod protocol;
/// Closed chains of steps
pub mod sequence;
/// A conversion quoted for an amount
pub mod step;
/// Test helpers and utilities
#[cfg(test)]
pub(crate) mod test_helpers;
/// Token identifiers
pub mod token;

pub use action::{Action, Deployment, TokenAmount};
pub use conversion::Conversion;
pub use finder::{actionable, best, OpportunityFinder};
pub use graph::ConversionGraph;
pub use numeric::{Ray, Wad};
pub use offer::Offer;
pub use protocol::{ProtocolState, ProtocolTokens};
pub use sequence::Sequence;
pub use step::Step;
pub use token::TokenId;
