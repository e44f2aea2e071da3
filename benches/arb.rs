use alloy::primitives::{Address, U256};
use arbitrage_keeper::arb::{
    best, ConversionGraph, OpportunityFinder, Offer, ProtocolState, ProtocolTokens, Ray, TokenId,
    Wad,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;

/// Token id for a small index
fn token(index: usize) -> TokenId {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&(index as u64 + 1).to_be_bytes());
    TokenId::from(Address::from(bytes))
}

/// Random book of `offer_count` offers over `token_count` tokens, priced
/// within a few percent of parity
fn generate_offers(rng: &mut impl Rng, offer_count: usize, token_count: usize) -> Vec<Offer> {
    (0..offer_count)
        .map(|i| {
            let sell = rng.random_range(0..token_count);
            let mut buy = rng.random_range(0..token_count);
            while buy == sell {
                buy = rng.random_range(0..token_count);
            }

            let buy_amount = rng.random_range(10u64..1_000);
            let premium = rng.random_range(95u64..=106);
            Offer::new(
                U256::from(i),
                token(sell),
                Wad::from_number(buy_amount * premium)
                    .checked_div(Wad::from_number(100))
                    .unwrap(),
                token(buy),
                Wad::from_number(buy_amount),
            )
        })
        .collect()
}

/// Protocol over the first three tokens with some surplus to auction
fn protocol_state() -> ProtocolState {
    ProtocolState {
        tokens: ProtocolTokens {
            collateral: token(1),
            pooled: token(2),
            stablecoin: token(0),
        },
        feed_price: Wad::from_number(500),
        collateral_ratio: Ray::one(),
        liquidation_ratio: Ray::one(),
        spread: "0.95".parse().unwrap(),
        join_spread: Wad::from_number(1),
        surplus_available: Wad::from_number(50_000),
        deficit_available: Wad::ZERO,
        collateral_for_sale: Wad::ZERO,
    }
}

/// Benchmark graph building, the search and ranking for one block
fn bench_find_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_sequences");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(5));

    let mut rng = rand::rng();
    let base_token = token(0);

    for token_count in [3usize, 4, 5] {
        let offer_count = token_count * 10;
        let tokens: Vec<TokenId> = (0..token_count).map(token).collect();
        let offers = generate_offers(&mut rng, offer_count, token_count);
        let protocol = protocol_state();

        let graph = ConversionGraph::from_market(&tokens, &offers, Some(&protocol));
        let found = OpportunityFinder::new(&graph).find_sequences(base_token, Wad::from_number(100));
        println!(
            "{} tokens, {} offers: {} conversions, {} sequences",
            token_count,
            offer_count,
            graph.len(),
            found.len()
        );

        group.throughput(criterion::Throughput::Elements(offer_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(token_count),
            &token_count,
            |b, _| {
                b.iter(|| {
                    let graph = ConversionGraph::from_market(&tokens, &offers, Some(&protocol));
                    let sequences = OpportunityFinder::new(&graph)
                        .find_sequences(base_token, black_box(Wad::from_number(100)));
                    black_box(best(sequences, base_token, Wad::ZERO).unwrap())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_find_sequences);
criterion_main!(benches);
