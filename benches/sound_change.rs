//! Criterion benchmarks for rule parsing, forward application, backward
//! reconstruction and interaction analysis.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use libsoundchange::prelude::*;

// ============================================================================
// Benchmark Fixtures
// ============================================================================

const RULES: &[&str] = &[
    "p > b",
    "n > m / _ p",
    "C > @2[+voiced] / V _ V",
    "{p|t|k} > {f|θ|x}",
    "C+ > :null: / _ #",
    ":null: > e / # _ s",
];

fn sample_words() -> Vec<Sequence> {
    [
        "# p a #",
        "# a n p a #",
        "# s t a p a t a k #",
        "# k a p a t a n p a s t #",
        "# p a t a k a p a t a k a n p a s t #",
    ]
    .iter()
    .map(|w| parse_sequence(w).unwrap())
    .collect()
}

fn parsed_rules() -> Vec<Rule> {
    RULES.iter().map(|r| parse_rule(r).unwrap()).collect()
}

// ============================================================================
// Parsing
// ============================================================================

fn bench_parse_rule(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_rule");
    let changer = SoundChanger::new();

    for (i, source) in RULES.iter().enumerate() {
        group.bench_function(BenchmarkId::new("rule", i), |b| {
            b.iter(|| black_box(changer.parse_rule(black_box(source))))
        });
    }

    group.finish();
}

// ============================================================================
// Forward / backward
// ============================================================================

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward");
    let changer = SoundChanger::new();
    let rules = parsed_rules();
    let words = sample_words();

    for word in &words {
        group.throughput(Throughput::Elements(word.len() as u64));
        group.bench_with_input(BenchmarkId::new("all_rules", word.len()), word, |b, word| {
            b.iter(|| {
                for rule in &rules {
                    black_box(changer.forward(black_box(word), rule).unwrap());
                }
            });
        });
    }

    group.finish();
}

fn bench_backward(c: &mut Criterion) {
    let mut group = c.benchmark_group("backward");
    let changer = SoundChanger::new();
    let rules = parsed_rules();
    let words = sample_words();

    for (i, rule) in rules.iter().enumerate() {
        group.bench_function(BenchmarkId::new("rule", i), |b| {
            b.iter(|| {
                for word in &words {
                    black_box(changer.backward(black_box(word), rule).unwrap());
                }
            });
        });
    }

    group.finish();
}

fn bench_gradient(c: &mut Criterion) {
    let changer = SoundChanger::new();
    let rule = changer.parse_rule("{p|t|k} > {b|d|g}").unwrap();
    let words = sample_words();

    c.bench_function("gradient/half_strength", |b| {
        b.iter(|| {
            for word in &words {
                black_box(changer.apply_gradient_rule(word, &rule, 0.5, Some(7)).unwrap());
            }
        });
    });
}

// ============================================================================
// Interaction analysis
// ============================================================================

fn bench_interactions(c: &mut Criterion) {
    let mut group = c.benchmark_group("interactions");
    let changer = SoundChanger::new();
    let rules = parsed_rules();

    for n in [2, 4, rules.len()] {
        group.bench_with_input(BenchmarkId::new("rules", n), &rules[..n], |b, rules| {
            b.iter(|| {
                let interactions = changer.analyze_interactions(black_box(rules), None).unwrap();
                black_box(recommend_ordering(&interactions))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_rule,
    bench_forward,
    bench_backward,
    bench_gradient,
    bench_interactions
);
criterion_main!(benches);
