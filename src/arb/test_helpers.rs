#![allow(clippy::unwrap_used)]
use std::sync::Arc;

use alloy::primitives::{Address, U256};

use super::conversion::Conversion;
use super::graph::ConversionGraph;
use super::numeric::{Ray, Wad};
use super::offer::Offer;
use super::protocol::{ProtocolState, ProtocolTokens};
use super::sequence::Sequence;
use super::step::Step;
use super::token::TokenId;

/// Deterministic address for a short symbol such as "SAI"
pub fn address_from_str(symbol: &str) -> Address {
    Address::left_padding_from(symbol.as_bytes())
}

pub fn token(symbol: &str) -> TokenId {
    TokenId::from(address_from_str(symbol))
}

pub fn wad(value: &str) -> Wad {
    value.parse().unwrap()
}

pub fn ray(value: &str) -> Ray {
    value.parse().unwrap()
}

/// Offer selling `sell_amount` of `sell` for `buy_amount` of `buy`
pub fn offer(id: u64, sell: &str, sell_amount: &str, buy: &str, buy_amount: &str) -> Offer {
    Offer::new(
        U256::from(id),
        token(sell),
        wad(sell_amount),
        token(buy),
        wad(buy_amount),
    )
}

pub fn take(id: u64, sell: &str, sell_amount: &str, buy: &str, buy_amount: &str) -> Conversion {
    Conversion::Take(offer(id, sell, sell_amount, buy, buy_amount))
}

pub fn protocol_tokens() -> ProtocolTokens {
    ProtocolTokens {
        collateral: token("GEM"),
        pooled: token("SKR"),
        stablecoin: token("SAI"),
    }
}

/// Feed at 500 SAI per SKR, 0.95 auction spread (ask 475, bid 525), no surplus or debt
pub fn protocol_state() -> ProtocolState {
    ProtocolState {
        tokens: protocol_tokens(),
        feed_price: wad("500"),
        collateral_ratio: ray("1"),
        liquidation_ratio: ray("1.5"),
        spread: wad("0.95"),
        join_spread: wad("1"),
        surplus_available: Wad::ZERO,
        deficit_available: Wad::ZERO,
        collateral_for_sale: Wad::ZERO,
    }
}

pub fn shared(state: ProtocolState) -> Arc<ProtocolState> {
    Arc::new(state)
}

pub fn step(conversion: &Conversion, amount: &str) -> Step {
    Step::new(conversion, wad(amount)).unwrap()
}

/// Graph over SAI, SKR and GEM made only of the given offers
pub fn book(offers: &[(u64, &str, &str, &str, &str)]) -> ConversionGraph {
    let offers: Vec<Offer> = offers
        .iter()
        .map(|(id, sell, sell_amount, buy, buy_amount)| {
            offer(*id, sell, sell_amount, buy, buy_amount)
        })
        .collect();
    ConversionGraph::from_market(&protocol_tokens().all(), &offers, None)
}

/// The three-offer cycle SAI -> SKR -> GEM -> SAI worth 15 SAI on 100 SAI
pub fn three_offer_book() -> ConversionGraph {
    book(&[
        (1, "SKR", "105", "SAI", "100"),
        (2, "GEM", "110", "SKR", "105"),
        (3, "SAI", "115", "GEM", "110"),
    ])
}

pub fn sequence(conversions: &[Conversion], entry: &str) -> Sequence {
    let path: Vec<&Conversion> = conversions.iter().collect();
    Sequence::quote(&path, wad(entry)).unwrap().unwrap()
}
