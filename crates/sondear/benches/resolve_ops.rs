//! Resolution Benchmarks
//!
//! Benchmarks for the element cache, selector lowering, and the cache-hit
//! resolve path against the mock session.
//!
//! Run with: `cargo bench --bench resolve_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sondear::mock::{MockElement, MockSession};
use sondear::prelude::*;
use sondear::{ElementCache, Selector};
use std::sync::Arc;

fn bench_cache_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("element_cache");

    for size in [16usize, 256, 4096] {
        let cache = ElementCache::new();
        for i in 0..size {
            cache.put(&format!("loc-{i}"), ElementHandle::new(format!("e{i}"), Platform::Web));
        }
        group.bench_with_input(BenchmarkId::new("get_hit", size), &size, |bench, _| {
            bench.iter(|| black_box(cache.get(black_box("loc-7"))));
        });
        group.bench_with_input(BenchmarkId::new("put_replace", size), &size, |bench, _| {
            bench.iter(|| {
                cache.put(
                    black_box("loc-3"),
                    ElementHandle::new("replacement", Platform::Web),
                );
            });
        });
    }

    group.finish();
}

fn bench_selector_lowering(c: &mut Criterion) {
    let mut group = c.benchmark_group("selector_to_wire");

    let cases = [
        ("css", Selector::new(SelectorKind::Css, "form input[type=\"text\"]"), Platform::Web),
        ("web_name", Selector::new(SelectorKind::Name, "username"), Platform::Web),
        ("web_id", Selector::new(SelectorKind::Id, "submit"), Platform::Web),
        ("ios_chain", Selector::new(SelectorKind::Chain, "**/XCUIElementTypeCell[1]"), Platform::Ios),
        ("android_id", Selector::new(SelectorKind::Id, "com.app:id/login"), Platform::Android),
    ];

    for (name, selector, platform) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &selector, |bench, sel| {
            bench.iter(|| black_box(sel.to_wire(black_box(platform))));
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    let ctx = TestContext::new(ResolverConfig::new().with_time_unit_ms(1)).unwrap();
    let session = Arc::new(MockSession::new(Platform::Web));
    session.insert(MockElement::new("#submit"));
    ctx.register_session(session);
    let submit = Locator::web("submit", SelectorKind::Css, "#submit");

    group.bench_function("cache_hit_trust", |bench| {
        bench.iter(|| black_box(ctx.resolve(black_box(&submit), ElementState::Present).unwrap()));
    });

    group.bench_function("cache_miss", |bench| {
        bench.iter(|| {
            ctx.clear_cache();
            black_box(ctx.resolve(black_box(&submit), ElementState::Present).unwrap())
        });
    });

    group.bench_function("is_element_present", |bench| {
        bench.iter(|| black_box(ctx.is_element(ElementState::Present, &submit).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_cache_ops, bench_selector_lowering, bench_resolve);
criterion_main!(benches);
