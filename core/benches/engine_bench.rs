use catalog_core::tokenizer::tokenize;
use catalog_core::{query, Filters, InvertedIndex, RawRecord};
use criterion::{criterion_group, criterion_main, Criterion};

const COLORS: &[&str] = &["black", "white", "navy", "olive", "red", "grey"];
const KINDS: &[&str] = &["jacket", "jeans", "sneaker", "hoodie", "dress", "scarf", "coat"];
const SIZES: &[&str] = &["XS", "S", "M", "L", "XL"];

fn synthetic_catalog(n: usize) -> Vec<RawRecord> {
    (0..n)
        .map(|i| {
            let color = COLORS[i % COLORS.len()];
            let kind = KINDS[i % KINDS.len()];
            RawRecord::new()
                .name(format!("{color} {kind} #{i}"))
                .description(format!("A {color} {kind} in soft cotton, relaxed fit, item {i}"))
                .price((i % 200) as f64 + 9.99)
                .category(kind)
                .sizes([SIZES[i % SIZES.len()]])
        })
        .collect()
}

fn bench_engine(c: &mut Criterion) {
    c.bench_function("tokenize_description", |b| {
        b.iter(|| tokenize("Men's slim-fit black leather biker jacket, size M (regular), 100% lambskin"))
    });
    c.bench_function("build_10k", |b| b.iter(|| InvertedIndex::build(synthetic_catalog(10_000)).unwrap()));

    let index = InvertedIndex::build(synthetic_catalog(10_000)).unwrap();
    let filters = Filters::new().size("m").min_price(20.0).max_price(150.0);
    c.bench_function("query_10k", |b| b.iter(|| query(&index, "black cotton jacket", &filters, None).unwrap()));
    c.bench_function("query_10k_browse", |b| b.iter(|| query(&index, "", &filters, Some(50)).unwrap()));
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
