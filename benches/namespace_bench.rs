use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use html_namespacing::add_namespace_to_html;
use std::hint::black_box;

const NAMESPACE: &str = "users-show";

/// Sibling top-level blocks, each with nested markup and an existing class
fn make_blocks(blocks: usize) -> String {
    let mut html = String::with_capacity(blocks * 64);
    for i in 0..blocks {
        html.push_str("<div class=\"box\"><span>hello</span><img src=\"x.png\"/></div>");
        if i % 4 == 0 {
            html.push_str("<!-- separator <p> -->");
        }
    }
    html
}

/// One top-level element wrapping a large body: injection happens once
fn make_single_root(bytes: usize) -> String {
    let mut html = String::with_capacity(bytes + 32);
    html.push_str("<section>");
    while html.len() < bytes {
        html.push_str("<p>Lorem ipsum dolor sit amet, <em>consectetur</em> adipiscing.</p>");
    }
    html.push_str("</section>");
    html
}

fn bench_many_roots(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_roots");
    for blocks in [64, 20_000] {
        let input = make_blocks(blocks);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &input, |b, input| {
            b.iter(|| {
                let out = add_namespace_to_html(black_box(input.as_bytes()), NAMESPACE);
                black_box(out.map(|html| html.len()).ok());
            });
        });
    }
    group.finish();
}

fn bench_single_root(c: &mut Criterion) {
    let input = make_single_root(1 << 20);
    let mut group = c.benchmark_group("single_root");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("1MiB", |b| {
        b.iter(|| {
            let out = add_namespace_to_html(black_box(input.as_bytes()), NAMESPACE);
            black_box(out.map(|html| html.len()).ok());
        });
    });
    group.finish();
}

fn bench_rejection(c: &mut Criterion) {
    // Unbalanced at the very end: the whole input is scanned before failing.
    let mut input = make_blocks(20_000);
    input.push_str("<div>");
    c.bench_function("reject_unbalanced_large", |b| {
        b.iter(|| {
            let out = add_namespace_to_html(black_box(input.as_bytes()), NAMESPACE);
            black_box(out.is_err());
        });
    });
}

criterion_group!(benches, bench_many_roots, bench_single_root, bench_rejection);
criterion_main!(benches);
