use criterion::{criterion_group, criterion_main, Criterion};
use relief::{Grid, Method, PointCloud};

fn gpx_dir() -> std::path::PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "..", "data", "gpx"]
        .iter()
        .collect()
}

fn interpolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Interpolation");

    let (cloud, _) = PointCloud::from_dir(gpx_dir()).unwrap();
    let _10m = 0.0001;

    for method in [Method::Nearest, Method::Linear] {
        group.bench_with_input(method.to_string(), &(&cloud, _10m), |b, (cloud, pixel)| {
            b.iter(|| Grid::interpolate(cloud, *pixel, method).unwrap())
        });
    }
}

criterion_group!(benches, interpolation);
criterion_main!(benches);
