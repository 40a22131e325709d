use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fcsframe::fcs::{FcsReader, FcsWriter};
use fcsframe::frame::{Dimension, Frame};
use fcsframe::persist;

/// FCS 3.1 bytes with `parameters` double channels
fn fcs_bytes(events: usize, parameters: usize) -> Vec<u8> {
    let mut keywords = BTreeMap::new();
    keywords.insert("$FIL".to_string(), "bench.fcs".to_string());
    let mut frame = Frame::new(keywords, events);
    for p in 0..parameters {
        let values = (0..events).map(|i| ((i * 31 + p * 7) % 65_536) as f64).collect();
        frame
            .add_dimension(Dimension::new(p + 1, format!("FL{}-A", p + 1), values))
            .unwrap();
    }
    FcsWriter::new().to_bytes(&frame)
}

fn bench_fcs_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("fcs_parse");
    let reader = FcsReader::default();

    for events in [10_000, 100_000] {
        let bytes = fcs_bytes(events, 12);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(events), &bytes, |b, bytes| {
            b.iter(|| black_box(reader.parse(bytes).unwrap()));
        });
    }
    group.finish();
}

fn bench_persist(c: &mut Criterion) {
    let frame = FcsReader::default().parse(&fcs_bytes(100_000, 12)).unwrap();
    let saved = persist::save(&frame).unwrap();

    let mut group = c.benchmark_group("persist");
    group.throughput(Throughput::Bytes(saved.len() as u64));
    group.bench_function("save", |b| b.iter(|| black_box(persist::save(&frame).unwrap())));
    group.bench_function("load", |b| b.iter(|| black_box(persist::load(&saved).unwrap())));
    group.finish();
}

criterion_group!(benches, bench_fcs_parse, bench_persist);
criterion_main!(benches);
