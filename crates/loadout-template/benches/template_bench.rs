//! Criterion benchmarks for template encoding and validation.

use criterion::{Criterion, criterion_group, criterion_main};
use loadout_core::grid::{GridConfiguration, GridDimensions};
use loadout_core::test_utils::*;
use loadout_template::{TemplateConfig, decode};

/// A 10x10 grid tiled with 2x2 shields.
fn tiled_shields() -> GridConfiguration {
    (0..5)
        .flat_map(|y| (0..5).map(move |x| (SHIELD, pos(x * 2, y * 2))))
        .collect()
}

fn bench_template(c: &mut Criterion) {
    let catalog = test_catalog();
    let cfg = TemplateConfig::default();
    let codec = cfg.codec(&catalog);
    let validator = cfg.validator(&catalog);
    let dims = GridDimensions::new(10, 10);
    let configuration = tiled_shields();

    let mut group = c.benchmark_group("template");
    group.sample_size(50);

    group.bench_function("encode_bordered_10x10", |b| {
        b.iter(|| codec.encode_configuration(&configuration, dims, true));
    });

    let records = codec.encode_configuration(&configuration, dims, true);

    group.bench_function("validate_10x10", |b| {
        b.iter(|| validator.is_valid(dims, &records));
    });

    group.bench_function("decode_10x10", |b| {
        b.iter(|| decode(&records, dims.width));
    });

    group.finish();
}

criterion_group!(benches, bench_template);
criterion_main!(benches);
