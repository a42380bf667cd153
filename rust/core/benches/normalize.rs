// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark for feed decoding and normalization throughput.
//!
//! Run with: cargo bench -p footprints-core --bench normalize

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use footprints_core::{decode_feed, Normalizer};

const SOURCES: [&str; 3] = ["Photogrammetry", "Other (Man", "LiDAR"];
const STATES: [&str; 4] = ["Constructed", "Alteration", "Demolition", "Marked for Construction"];

/// Generate a synthetic feed body with `count` elements.
fn generate_feed(count: usize) -> Vec<u8> {
    let elements: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "base_bbl": (1_000_000_000 + i as i64).to_string(),
                "name": format!("Building {i}"),
                "cnstrct_yr": (1850 + i % 170).to_string(),
                "geomsource": SOURCES[i % SOURCES.len()],
                "groundelev": format!("{}", (i % 120) as f32 * 0.5),
                "heightroof": format!("{}", (i % 300) as f32 * 0.75),
                "lststatype": STATES[i % STATES.len()],
                "the_geom": {
                    "type": "MultiPolygon",
                    "coordinates": [[[
                        [-74.0 + (i % 1000) as f64 * 0.0003, 40.5 + (i % 700) as f64 * 0.0005],
                        [-74.0, 40.5],
                        [-73.9, 40.6]
                    ]]]
                }
            })
        })
        .collect();
    serde_json::to_vec(&elements).expect("serialize synthetic feed")
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_feed");
    for count in [1_000, 10_000] {
        let body = generate_feed(count);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &body, |b, body| {
            b.iter(|| decode_feed(black_box(body)).expect("decode"));
        });
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for count in [1_000, 10_000] {
        let records = decode_feed(&generate_feed(count)).expect("decode").records;
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter(|| {
                let mut normalizer = Normalizer::new();
                for record in records {
                    black_box(normalizer.normalize(record));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode, bench_normalize);
criterion_main!(benches);
