//! Benchmarks for mobiledoc-md rendering performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks render synthetic documents in both schema versions.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

/// Builds a 0.2.0 document with the given number of markup sections, each
/// carrying a nested bold/italic marker run.
fn create_test_doc_0_2(section_count: usize) -> Value {
    let sections: Vec<Value> = (0..section_count)
        .map(|i| {
            json!([1, "p", [
                [[0], 0, format!("section {i}: ")],
                [[1], 1, "emphasized "],
                [[], 1, "and bold text"]
            ]])
        })
        .collect();

    json!({
        "version": "0.2.0",
        "sections": [[["b"], ["i"]], sections]
    })
}

/// Builds a 0.3.0 document mixing markup sections, list sections, and
/// built-in image cards.
fn create_test_doc_0_3(section_count: usize) -> Value {
    let sections: Vec<Value> = (0..section_count)
        .map(|i| match i % 3 {
            0 => json!([1, "p", [
                [0, [0], 1, format!("paragraph {i}")],
                [0, [], 0, " tail"]
            ]]),
            1 => json!([3, "ol", [
                [[0, [], 0, "first"]],
                [[0, [], 0, "second"]],
                [[0, [], 0, "third"]]
            ]]),
            _ => json!([10, 0]),
        })
        .collect();

    json!({
        "version": "0.3.0",
        "atoms": [],
        "cards": [["image-card", { "src": "http://example.com/a.png" }]],
        "markups": [["b"]],
        "sections": sections
    })
}

/// Benchmark rendering at various document sizes.
fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for section_count in [10, 100, 1000].iter() {
        let doc_0_2 = create_test_doc_0_2(*section_count);
        let doc_0_3 = create_test_doc_0_3(*section_count);

        group.bench_function(format!("0_2_{}_sections", section_count), |b| {
            b.iter(|| mobiledoc_md::render(black_box(&doc_0_2)).unwrap().result);
        });

        group.bench_function(format!("0_3_{}_sections", section_count), |b| {
            b.iter(|| mobiledoc_md::render(black_box(&doc_0_3)).unwrap().result);
        });
    }

    group.finish();
}

/// Benchmark deeply nested marker runs (worst case for the inline walk).
fn bench_deep_nesting(c: &mut Criterion) {
    let depth = 64;
    let markups: Vec<Value> = (0..depth)
        .map(|i| if i % 2 == 0 { json!(["b"]) } else { json!(["i"]) })
        .collect();
    let opens: Vec<usize> = (0..depth).collect();
    let doc = json!({
        "version": "0.3.0",
        "atoms": [], "cards": [],
        "markups": markups,
        "sections": [[1, "p", [[0, opens, depth, "deep"]]]]
    });

    c.bench_function("deep_nesting", |b| {
        b.iter(|| mobiledoc_md::render(black_box(&doc)).unwrap().result);
    });
}

/// Benchmark renderer construction with a populated configuration.
fn bench_renderer_creation(c: &mut Criterion) {
    use mobiledoc_md::{Card, CardArgs, ImageCard, MarkdownRenderer, RendererConfig};

    struct NoopCard;
    impl Card for NoopCard {
        fn name(&self) -> &str {
            "noop-card"
        }
        fn render(&self, _args: CardArgs<'_>) -> mobiledoc_md::Result<Option<String>> {
            Ok(None)
        }
    }

    c.bench_function("renderer_creation", |b| {
        b.iter(|| {
            let config = RendererConfig::new()
                .with_card(NoopCard)
                .with_card(ImageCard)
                .with_card_options(json!({ "theme": "dark" }));
            MarkdownRenderer::new(config).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_rendering,
    bench_deep_nesting,
    bench_renderer_creation,
);
criterion_main!(benches);
