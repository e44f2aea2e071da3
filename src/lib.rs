/*!
 * # Arbitrage Keeper
 *
 * Finds and executes arbitrage between an on-chain order book and the
 * collateral protocol's own conversion mechanisms (join, exit and the surplus
 * and deficit auctions).
 *
 * ## Core Features
 *
 * - **Opportunity Engine**: Enumerates closed sequences of conversions that
 *   start and end in the base token and ranks them by profit
 * - **Execution**: Submits the best sequence atomically through a batching
 *   contract, or step by step
 * - **Error Budget**: Stops the keeper after too many failed executions
 *
 * ## Module Structure
 *
 * - `arb`: the opportunity engine
 * - `keeper`: the per-block driver and its collaborators
 * - `config`: command line and environment configuration
 * - `error`: typed engine errors
 * - `utils`: logging
 */

/// Opportunity engine
pub mod arb;
/// Command line and environment configuration
pub mod config;
/// Typed engine errors
pub mod error;
/// Per-block driver
pub mod keeper;
/// Utility functions and helpers
pub mod utils;
