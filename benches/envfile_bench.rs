use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lem::envfile;
use std::fs;
use std::hint::black_box;
use tempfile::tempdir;

fn create_central_env(size: usize) -> String {
    let mut env = String::from("# central env\n\n");
    for i in 0..size {
        env.push_str(&format!("SERVICE{}_KEY_{i} = value-{i}\n", i % 8));
    }
    env
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("envfile_parse");
    for size in [10, 100, 1000] {
        let content = create_central_env(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &content, |b, content| {
            b.iter(|| envfile::parse(black_box(content), envfile::DEFAULT_SIZE_HINT));
        });
    }
    group.finish();
}

fn benchmark_read_write(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let source = dir.path().join(".env");
    fs::write(&source, create_central_env(500)).unwrap();
    let env = envfile::read(&source, 512).unwrap();
    let target = dir.path().join("out/.env");

    c.bench_function("envfile_read_500", |b| {
        b.iter(|| envfile::read(black_box(&source), 512).unwrap());
    });
    c.bench_function("envfile_write_500", |b| {
        b.iter(|| envfile::write(black_box(&target), black_box(&env)).unwrap());
    });
}

criterion_group!(benches, benchmark_parse, benchmark_read_write);
criterion_main!(benches);
