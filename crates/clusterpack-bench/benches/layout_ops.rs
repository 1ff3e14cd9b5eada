//! Criterion micro-benchmarks for capacity estimation, schema layout and
//! whole-event region planning.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use clusterpack_arena::Cursor;
use clusterpack_bench::{planned_session, reference_arena, reference_config, synthetic_bounds};
use clusterpack_compression::{estimate_capacity, layout_cluster_fields, ModeGate};
use clusterpack_core::{EncodingTable, SchemaCounts};
use clusterpack_test_utils::fixtures::EventProfile;

/// Benchmark: capacity estimate from merger bounds.
fn bench_estimate_capacity(c: &mut Criterion) {
    let bounds = synthetic_bounds(400_000);
    c.bench_function("estimate_capacity", |b| {
        b.iter(|| black_box(estimate_capacity(black_box(&bounds)).unwrap()));
    });
}

/// Benchmark: full and reduced schema layout on a bare cursor.
fn bench_schema_layout(c: &mut Criterion) {
    let encoding = EncodingTable::default();
    let counts = SchemaCounts::new(400_000, 240_000, 3_000);
    for (name, reduced) in [("schema_layout_full", false), ("schema_layout_reduced", true)] {
        c.bench_function(name, |b| {
            b.iter(|| {
                let mut cursor = Cursor::new(0, 64);
                let handles = layout_cluster_fields(
                    &mut cursor,
                    black_box(counts),
                    reduced,
                    ModeGate::TRACK_MODEL,
                    &encoding,
                )
                .unwrap();
                black_box(handles.end());
            });
        });
    }
}

/// Benchmark: begin event, place pooled regions, place host output.
fn bench_event_cycle(c: &mut Criterion) {
    for profile in [EventProfile::pp(), EventProfile::heavy_ion()] {
        let (mut planner, mut registry) =
            planned_session(reference_config(), reference_arena()).unwrap();
        c.bench_function(&format!("event_cycle_{}", profile.name), |b| {
            b.iter(|| {
                planner
                    .prepare_event(&mut registry, &profile.bounds)
                    .unwrap();
                let header = planner
                    .finalize_output(
                        &mut registry,
                        profile.n_attached,
                        profile.n_tracks,
                        profile.n_unattached,
                    )
                    .unwrap();
                black_box(header);
            });
        });
    }
}

criterion_group!(
    benches,
    bench_estimate_capacity,
    bench_schema_layout,
    bench_event_cycle
);
criterion_main!(benches);
