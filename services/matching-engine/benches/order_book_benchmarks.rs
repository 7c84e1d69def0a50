use criterion::{criterion_group, criterion_main, Criterion};
use matching_engine::OrderBook;
use std::hint::black_box;
use types::prelude::*;

fn msft() -> Symbol {
    Symbol::new("MSFT").unwrap()
}

fn populated_asks(levels: u64) -> OrderBook {
    let mut book = OrderBook::new(msft());
    for i in 0..levels {
        book.add_order(
            OrderType::Limit,
            "maker".to_string(),
            Side::Sell,
            Price::new(10_100 + i),
            Quantity::new(10),
        );
    }
    book
}

// Benchmark for adding a resting limit order to an empty book
fn bench_add_limit_order(c: &mut Criterion) {
    c.bench_function("add_limit_order", |b| {
        b.iter_with_setup(
            || OrderBook::new(msft()),
            |mut book| {
                black_box(book.add_order(
                    OrderType::Limit,
                    "taker".to_string(),
                    Side::Buy,
                    Price::new(10_100),
                    Quantity::new(10),
                ));
            },
        )
    });
}

// Benchmark for a single immediate match
fn bench_immediate_match(c: &mut Criterion) {
    c.bench_function("immediate_match_limit", |b| {
        b.iter_with_setup(
            || populated_asks(1),
            |mut book| {
                black_box(book.add_order(
                    OrderType::Limit,
                    "taker".to_string(),
                    Side::Buy,
                    Price::new(10_100),
                    Quantity::new(5),
                ));
            },
        )
    });
}

// Benchmark for fill-and-kill against partial liquidity
fn bench_fill_and_kill(c: &mut Criterion) {
    c.bench_function("immediate_match_fill_and_kill", |b| {
        b.iter_with_setup(
            || populated_asks(1),
            |mut book| {
                black_box(book.add_order(
                    OrderType::FillAndKill,
                    "taker".to_string(),
                    Side::Buy,
                    Price::new(10_100),
                    Quantity::new(25),
                ));
            },
        )
    });
}

// Benchmark for the all-or-none gate plus fill
fn bench_fill_or_kill(c: &mut Criterion) {
    c.bench_function("immediate_match_fill_or_kill", |b| {
        b.iter_with_setup(
            || populated_asks(1),
            |mut book| {
                black_box(book.add_order(
                    OrderType::FillOrKill,
                    "taker".to_string(),
                    Side::Buy,
                    Price::new(10_100),
                    Quantity::new(10),
                ));
            },
        )
    });
}

// Benchmark for a market order sweeping several levels
fn bench_market_order_sweep(c: &mut Criterion) {
    c.bench_function("market_order_sweep", |b| {
        b.iter_with_setup(
            || populated_asks(10),
            |mut book| {
                black_box(book.add_order(
                    OrderType::Market,
                    "taker".to_string(),
                    Side::Buy,
                    Price::MIN,
                    Quantity::new(25),
                ));
            },
        )
    });
}

// Benchmark for cancelling a resting order
fn bench_cancel_order(c: &mut Criterion) {
    c.bench_function("cancel_order", |b| {
        b.iter_with_setup(
            || {
                let mut book = OrderBook::new(msft());
                let submission = book.add_order(
                    OrderType::Limit,
                    "maker".to_string(),
                    Side::Buy,
                    Price::new(10_100),
                    Quantity::new(10),
                );
                (book, submission.order_id.unwrap())
            },
            |(mut book, order_id)| {
                black_box(book.cancel_order(order_id)).unwrap();
            },
        )
    });
}

criterion_group!(
    benches,
    bench_add_limit_order,
    bench_immediate_match,
    bench_fill_and_kill,
    bench_fill_or_kill,
    bench_market_order_sweep,
    bench_cancel_order
);
criterion_main!(benches);
