// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//!
//! Benchmark: accessor hot paths
//!
//! Indexing a record, typed reads and writes, and bulk copy, on both a
//! declared struct and a runtime-built record.

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dynrecord::{new_struct, record, type_of, Accessor, AccessorMut, FieldRead};

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Sample in "bench" {
        pub id: u64,
        pub value: f64,
        pub label: String,
        pub parent: Option<u64>,
    }
}

// ============================================================================
// Benchmarks
// ============================================================================

/// Benchmark: building the name index
fn bench_accessor_new(c: &mut Criterion) {
    let mut group = c.benchmark_group("accessor");

    let sample = Sample::default();
    group.bench_function("new_static", |b| {
        b.iter(|| black_box(Accessor::new(black_box(&sample))));
    });

    let dynamic = new_struct()
        .add_field("id", type_of::<u64>(), "")
        .add_field("value", type_of::<f64>(), "")
        .add_field("label", type_of::<String>(), "")
        .add_field("parent", type_of::<Option<u64>>(), "")
        .build()
        .new_instance();
    group.bench_function("new_dynamic", |b| {
        b.iter(|| black_box(Accessor::new(black_box(&dynamic))));
    });

    group.finish();
}

/// Benchmark: typed reads through an existing accessor
fn bench_typed_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("accessor");

    let sample = Sample {
        id: 7,
        value: 1.5,
        label: "x".into(),
        parent: Some(3),
    };
    let reader = Accessor::new(&sample);

    group.bench_function("read_uint64", |b| {
        b.iter(|| black_box(reader.field(black_box("id")).map(|f| f.uint64())));
    });

    group.bench_function("read_pointer_uint64", |b| {
        b.iter(|| black_box(reader.field(black_box("parent")).and_then(|f| f.pointer_uint64())));
    });

    group.bench_function("read_string", |b| {
        b.iter(|| black_box(reader.field(black_box("label")).map(|f| f.string())));
    });

    group.finish();
}

/// Benchmark: typed writes into a runtime record
fn bench_typed_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("accessor");

    let ty = new_struct()
        .add_field("Count", type_of::<u32>(), "")
        .add_field("Maybe", type_of::<Option<i64>>(), "")
        .build();
    let mut data = ty.new_instance();
    let mut writer = AccessorMut::new(&mut data);

    group.bench_function("write_uint32", |b| {
        let mut n = 0u32;
        b.iter(|| {
            n = n.wrapping_add(1);
            if let Some(mut field) = writer.field_mut("Count") {
                let _ = black_box(field.set_uint32(n));
            }
        });
    });

    group.bench_function("write_pointer_int64", |b| {
        b.iter(|| {
            if let Some(mut field) = writer.field_mut("Maybe") {
                let _ = black_box(field.set_pointer_int64(Some(black_box(-1))));
            }
        });
    });

    group.finish();
}

/// Benchmark: bulk copy over sequences of increasing length
fn bench_to_struct(c: &mut Criterion) {
    let mut group = c.benchmark_group("accessor_to_struct");

    for len in [1usize, 10, 100].iter() {
        let items: Vec<Sample> = (0..*len as u64)
            .map(|i| Sample {
                id: i,
                ..Default::default()
            })
            .collect();
        let target = extend_target();

        group.bench_with_input(BenchmarkId::from_parameter(len), len, |b, _| {
            b.iter(|| {
                let accessor = Accessor::new(&items);
                for element in accessor.to_sequence_of_accessors().unwrap_or_default() {
                    let mut copy = target.new_instance();
                    let _ = black_box(element.to_struct(&mut copy));
                }
            });
        });
    }

    group.finish();
}

fn extend_target() -> dynrecord::DynamicStruct {
    dynrecord::extend_struct(&Sample::default()).build()
}

criterion_group!(
    benches,
    bench_accessor_new,
    bench_typed_reads,
    bench_typed_writes,
    bench_to_struct
);
criterion_main!(benches);
