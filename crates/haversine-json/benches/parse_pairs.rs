//! Benchmark – `haversine_json::parse` over generated pair documents
#![allow(missing_docs)]

use core::fmt::Write;
use std::time::Duration;

use criterion::{
    BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use haversine_json::{ParserOptions, ValueRef, parse};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// A *deterministic* pairs document with `count` entries, coordinates spread
/// uniformly over the sphere.
fn make_pairs_payload(count: usize) -> String {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut s = String::with_capacity(count * 96);
    s.push_str("{\"pairs\":[\n");
    for i in 0..count {
        if i > 0 {
            s.push_str(",\n");
        }
        let [x0, y0, x1, y1]: [f64; 4] = core::array::from_fn(|_| rng.random::<f64>() * 180.0);
        write!(
            s,
            "    {{\"x0\":{x0:.16}, \"y0\":{y0:.16}, \"x1\":{x1:.16}, \"y1\":{y1:.16}}}"
        )
        .unwrap();
    }
    s.push_str("\n]}\n");
    s
}

/// Parses `payload` and touches every pair so the tree walk is measured too.
fn run_parse(payload: &str) -> f64 {
    let doc = parse(payload.as_bytes(), ParserOptions::default()).unwrap();
    let pairs = doc.root().get("pairs").and_then(ValueRef::as_array).unwrap();
    pairs
        .iter()
        .filter_map(ValueRef::as_object)
        .filter_map(|pair| pair.get("x0").and_then(ValueRef::as_number))
        .sum()
}

fn bench_parse_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_pairs");

    for &count in &[100usize, 1_000, 10_000] {
        let payload = make_pairs_payload(count);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &payload, |b, p| {
            b.iter(|| black_box(run_parse(black_box(p))));
        });
    }
    group.finish();
}

fn bench_tokenize_only(c: &mut Criterion) {
    let payload = make_pairs_payload(1_000);
    let mut group = c.benchmark_group("tokenize");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("1000", |b| {
        b.iter(|| {
            let mut tokens = haversine_json::Arena::with_capacity("tokens", payload.len() + 1);
            let mut literals = haversine_json::Arena::with_capacity("literals", payload.len() * 8);
            haversine_json::tokenize(black_box(payload.as_bytes()), &mut tokens, &mut literals)
                .unwrap();
            black_box(tokens.used())
        });
    });
    group.finish();
}

fn criterion() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(5))
}

criterion_group! { name = benches; config = criterion(); targets = bench_parse_pairs, bench_tokenize_only }
criterion_main!(benches);
