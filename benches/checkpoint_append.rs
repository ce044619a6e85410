use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;
use tempfile::TempDir;
use waymark::core::config::Config;
use waymark::core::store::Store;
use waymark::plugins::checkpoint::CheckpointService;

fn bench_checkpoint_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkpoint");
    group.measurement_time(Duration::from_secs(10));

    let tmp = TempDir::new().unwrap();
    let svc = CheckpointService::open(&Store::for_project(tmp.path()), &Config::default()).unwrap();

    group.bench_function("save_single_agent", |b| {
        b.iter(|| {
            black_box(svc.save("implementer", "stage complete").unwrap());
        });
    });

    group.bench_function("latest_single_agent", |b| {
        b.iter(|| {
            black_box(svc.latest("implementer").unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_checkpoint_append);
criterion_main!(benches);
