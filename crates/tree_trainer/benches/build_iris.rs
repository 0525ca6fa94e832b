use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use entropy_tree_trainer::{
    build_tree, classify_table, BuilderConfig, CsvOptions, Dataset, FeatureTable,
};

const IRIS_CSV: &str = include_str!("../tests/data/iris.csv");

fn benchmark_build_iris(c: &mut Criterion) {
    let dataset = Dataset::from_reader(IRIS_CSV.as_bytes(), &CsvOptions::default())
        .expect("iris fixture loads");

    let mut group = c.benchmark_group("build_iris");
    group.throughput(Throughput::Elements(dataset.len() as u64));
    group.bench_function("build_150_rows_step_0_1", |b| {
        b.iter(|| {
            let tree = build_tree(&dataset, BuilderConfig::default()).expect("iris builds");
            criterion::black_box(tree);
        });
    });
    group.finish();
}

fn benchmark_classify_iris(c: &mut Criterion) {
    let dataset = Dataset::from_reader(IRIS_CSV.as_bytes(), &CsvOptions::default())
        .expect("iris fixture loads");
    let table = FeatureTable::from_reader(IRIS_CSV.as_bytes(), &CsvOptions::default())
        .expect("iris fixture loads");
    let tree = build_tree(&dataset, BuilderConfig::default()).expect("iris builds");

    let mut group = c.benchmark_group("classify_iris");
    group.throughput(Throughput::Elements(table.len() as u64));
    group.bench_function("classify_150_rows", |b| {
        b.iter(|| {
            let predictions = classify_table(&tree, &table).expect("columns match");
            criterion::black_box(predictions);
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_build_iris, benchmark_classify_iris);
criterion_main!(benches);
