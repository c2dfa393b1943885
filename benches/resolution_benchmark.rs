//! Benchmarks for generation resolution, index loading and delta computation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use product_runtime::delta::{compute_delta, DefaultDeltaOptions, ModelObject};
use product_runtime::toc::{GenerationTocEntry, ProductTocEntry, TableOfContents, TocEntry, TocEntryBase};
use std::hint::black_box;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).single().expect("valid date")
}

/// A product with one generation per day.
fn product(index: usize, generations: usize) -> ProductTocEntry {
    let mut product = ProductTocEntry::new(
        TocEntryBase::new(
            format!("p{index}"),
            format!("products.P{index}"),
            format!("products/P{index}.xml"),
            "org.example.Product",
        ),
        format!("kind{}", index % 10),
        format!("v{index}"),
    );
    for day in 0..generations {
        let days = i64::try_from(day).expect("day fits");
        product.add_generation(GenerationTocEntry::new(epoch() + Duration::days(days)));
    }
    product
}

fn toc_xml(products: usize, generations: usize) -> String {
    let toc = TableOfContents::readonly("1.0");
    for i in 0..products {
        toc.add_entry(TocEntry::product(product(i, generations)));
    }
    toc.to_xml().expect("serializable")
}

fn benchmark_as_of(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation_as_of");
    for generations in [10, 1_000, 100_000] {
        let product = product(0, generations);
        let halfway = i64::try_from(generations / 2).expect("fits");
        let at = epoch() + Duration::days(halfway) + Duration::hours(12);
        group.bench_with_input(BenchmarkId::from_parameter(generations), &at, |b, at| {
            b.iter(|| black_box(product.generation_as_of(black_box(*at))));
        });
    }
    group.finish();
}

fn benchmark_load(c: &mut Criterion) {
    let xml = toc_xml(1_000, 12);
    c.bench_function("load_1000_products", |b| {
        b.iter(|| TableOfContents::from_xml_str(black_box(&xml)).expect("loads"));
    });
}

fn benchmark_diff(c: &mut Criterion) {
    let old = TableOfContents::from_xml_str(&toc_xml(1_000, 12)).expect("loads").snapshot();
    let new_toc = TableOfContents::from_xml_str(&toc_xml(1_000, 12)).expect("loads");
    let mut changed = product(500, 12);
    changed.add_generation(GenerationTocEntry::new(epoch() + Duration::days(400)));
    new_toc.add_entry(TocEntry::product(changed));
    let new = new_toc.snapshot();
    let options = DefaultDeltaOptions::new();

    c.bench_function("diff_1000_products", |b| {
        b.iter(|| {
            compute_delta(
                Some(&old as &dyn ModelObject),
                Some(&new as &dyn ModelObject),
                &options,
            )
            .expect("delta")
            .node_count()
        });
    });
}

criterion_group!(benches, benchmark_as_of, benchmark_load, benchmark_diff);
criterion_main!(benches);
