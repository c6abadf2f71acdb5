//! Benchmarks for tokenizing and resolving choice templates
//!
//! Run with: cargo bench -p choicetext-core

use choicetext_core::{evaluate, resolve, tokenize, MarkerConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A card-sized template with default markers.
const CARD_SAMPLE: &str = "'(Translate|Give the meaning of|What does this mean:) \
'(le chat|la maison|'(un|le) chien) ? '(Answer in English.|Use a full sentence.|)";

/// Long plain text with scattered characters that look like markers.
const PROSE_SAMPLE: &str = "It's a long paragraph (with parentheses) and pipes | here \
and there, quoting 'single' words, and never opening a group. ";

/// Deeply nested groups.
fn nested_sample(depth: usize) -> String {
    let mut template = String::from("leaf");
    for level in 0..depth {
        template = format!("'({}|alt{})", template, level);
    }
    template
}

fn bench_card(c: &mut Criterion) {
    let config = MarkerConfig::default();
    let mut group = c.benchmark_group("card");
    group.throughput(Throughput::Bytes(CARD_SAMPLE.len() as u64));

    group.bench_function("tokenize", |b| {
        b.iter(|| black_box(tokenize(black_box(CARD_SAMPLE), &config).len()))
    });

    let tokens = tokenize(CARD_SAMPLE, &config);
    let mut rng = StdRng::seed_from_u64(7);
    group.bench_function("evaluate", |b| {
        b.iter(|| black_box(evaluate(black_box(&tokens), &mut rng).unwrap()))
    });

    group.bench_function("resolve", |b| {
        b.iter(|| black_box(resolve(black_box(CARD_SAMPLE), &config, &mut rng).unwrap()))
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let config = MarkerConfig::default();
    let mut group = c.benchmark_group("scaling");
    let mut rng = StdRng::seed_from_u64(7);

    for size in [1, 10, 100].iter() {
        let prose: String = PROSE_SAMPLE.repeat(*size);
        group.throughput(Throughput::Bytes(prose.len() as u64));
        group.bench_with_input(BenchmarkId::new("prose", size), &prose, |b, content| {
            b.iter(|| black_box(resolve(black_box(content), &config, &mut rng).unwrap()))
        });

        let cards: String = CARD_SAMPLE.repeat(*size);
        group.throughput(Throughput::Bytes(cards.len() as u64));
        group.bench_with_input(BenchmarkId::new("cards", size), &cards, |b, content| {
            b.iter(|| black_box(resolve(black_box(content), &config, &mut rng).unwrap()))
        });
    }

    group.finish();
}

fn bench_nesting(c: &mut Criterion) {
    let config = MarkerConfig::default();
    let mut group = c.benchmark_group("nesting");
    let mut rng = StdRng::seed_from_u64(7);

    for depth in [4, 32, 256].iter() {
        let template = nested_sample(*depth);
        group.bench_with_input(BenchmarkId::new("depth", depth), &template, |b, content| {
            b.iter(|| black_box(resolve(black_box(content), &config, &mut rng).unwrap()))
        });
    }

    // Unclosed starts exercise the correction pass.
    let unclosed = "'(open ".repeat(200);
    group.bench_function("unclosed", |b| {
        b.iter(|| black_box(resolve(black_box(&unclosed), &config, &mut rng).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_card, bench_scaling, bench_nesting);
criterion_main!(benches);
