use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fcsframe::transform::{Logicle, LogicleParams, Transform};

/// Raw values spread over the negative, linear and log regions
fn sample_values(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            if i % 5 == 0 {
                -200.0 * t
            } else {
                262_144.0 * t * t
            }
        })
        .collect()
}

fn bench_logicle_construction(c: &mut Criterion) {
    c.bench_function("logicle_new", |b| {
        b.iter(|| Logicle::new(black_box(LogicleParams::default())).unwrap());
    });
}

fn bench_logicle_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("logicle_scale");
    let transform = Transform::logicle(262_144.0, 0.5, 4.5, 0.0).unwrap();

    for n in [10_000, 100_000] {
        let values = sample_values(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("to_display", n), &values, |b, values| {
            b.iter(|| black_box(transform.to_display_all(values)));
        });

        let display = transform.to_display_all(&values);
        group.bench_with_input(BenchmarkId::new("to_raw", n), &display, |b, display| {
            b.iter(|| {
                let raw: Vec<f64> = display.iter().map(|&d| transform.to_raw(d)).collect();
                black_box(raw)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_logicle_construction, bench_logicle_scale);
criterion_main!(benches);
