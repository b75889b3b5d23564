use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pcd_core::pointcloud::point::Point;
use pcd_ground::{label_ground, CenteringMethod, GroundConfig};

fn synthetic_scan(n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let x = (i % 200) as f64 * 0.25;
            let y = (i / 200) as f64 * 0.25;
            // a few boxes standing on a slightly noisy floor
            let z = if (i / 7) % 11 == 0 {
                1.5
            } else {
                ((i * 7919) % 100) as f64 * 0.0005
            };
            Point::new(x, y, z).with_sequence_index(i as u64)
        })
        .collect()
}

fn bench_label_ground(c: &mut Criterion) {
    let scan = synthetic_scan(100_000);
    let mut group = c.benchmark_group("label_ground");

    for (name, centering) in [("mean", CenteringMethod::Mean), ("median", CenteringMethod::Median)] {
        for segments in [1, 8] {
            let config = GroundConfig {
                num_segments: segments,
                centering,
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(name, segments),
                &config,
                |b, config| b.iter(|| label_ground(black_box(scan.clone()), config).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_label_ground);
criterion_main!(benches);
